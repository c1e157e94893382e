//! Text rendering utilities

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
}

/// Generate PDF operators for text insertion
///
/// Creates the PDF text operators (BT, Tf, Td, Tj, ET) that draw already
/// encoded text with its baseline origin at `(x, y)` in user space.
///
/// # Arguments
/// * `text_hex` - Hex-encoded text (e.g., "<414243>")
/// * `x` - X coordinate in points (from left)
/// * `y` - Y coordinate in points (from bottom)
/// * `ctx` - Text rendering context
pub fn generate_text_operators(text_hex: &str, x: f64, y: f64, ctx: &TextRenderContext) -> Vec<u8> {
    let mut ops = String::new();

    ops.push_str("BT\n");
    ops.push_str("0 g\n");
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{x} {y} Td\n"));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(name: &str, size: f32) -> TextRenderContext {
        TextRenderContext {
            font_name: name.to_string(),
            font_size: size,
        }
    }

    #[test]
    fn test_generate_text_operators() {
        let ops = generate_text_operators("<414243>", 108.0, 102.0, &ctx("F1", 12.0));
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.starts_with("BT\n"));
        assert!(ops_str.contains("/F1 12 Tf"));
        assert!(ops_str.contains("108 102 Td"));
        assert!(ops_str.contains("<414243> Tj"));
        assert!(ops_str.ends_with("ET\n"));
    }

    #[test]
    fn test_generate_text_operators_fractional() {
        let ops = generate_text_operators("<41>", 10.5, 700.25, &ctx("F3", 9.0));
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("/F3 9 Tf"));
        assert!(ops_str.contains("10.5 700.25 Td"));
    }

    #[test]
    fn test_generate_text_operators_empty_text() {
        let ops = generate_text_operators("<>", 100.0, 700.0, &ctx("F1", 12.0));
        let ops_str = String::from_utf8(ops).unwrap();

        assert!(ops_str.contains("<> Tj"));
    }
}
