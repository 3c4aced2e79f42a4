//! Placeholder site icon.
//!
//! Served for `favicon.ico` requests when the site has no icon of its own.

/// Generate an SVG icon: a single circle filled with a random colour.
///
/// Every call draws a fresh colour; nothing is cached.
#[must_use]
pub fn generate() -> String {
    let color = random_color();
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 100 100\">\
         <circle cx=\"50\" cy=\"50\" r=\"45\" fill=\"{color}\" /></svg>"
    )
}

/// Uniformly random 24-bit colour as `#rrggbb`.
fn random_color() -> String {
    let rgb: [u8; 3] = rand::random();
    format!("#{}", hex::encode(rgb))
}
