// Color palette for series swatches

/// Color palette for categorical data
#[derive(Debug, Clone)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl ColorPalette {
    /// Create a Category10 color palette (D3-inspired)
    pub fn category10() -> Self {
        ColorPalette {
            colors: [
                "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
                "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }

    /// Palette from caller-supplied colors, Category10 when the list is empty
    pub fn from_colors(colors: Vec<String>) -> Self {
        if colors.is_empty() {
            Self::category10()
        } else {
            ColorPalette { colors }
        }
    }

    /// Get color for a specific index (wraps around if index > palette size)
    pub fn get_color(&self, index: usize) -> String {
        self.colors[index % self.colors.len()].clone()
    }

    /// One color per series bucket, index-aligned
    pub fn assign(&self, count: usize) -> Vec<String> {
        (0..count).map(|i| self.get_color(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_palette_category10() {
        let palette = ColorPalette::category10();
        assert_eq!(palette.get_color(0), "#1f77b4");
        assert_eq!(palette.get_color(9), "#17becf");
        // Test wrapping
        assert_eq!(palette.get_color(10), "#1f77b4");
    }

    #[test]
    fn test_from_colors_falls_back() {
        assert_eq!(ColorPalette::from_colors(vec![]).get_color(1), "#ff7f0e");
        let custom = ColorPalette::from_colors(vec!["red".to_string(), "blue".to_string()]);
        assert_eq!(custom.assign(3), vec!["red", "blue", "red"]);
    }
}
