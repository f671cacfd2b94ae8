use std::collections::HashMap;

use crate::types::TshirtColor;

/// Built-in product-shot catalog
const fn builtin_template(color: TshirtColor) -> &'static str {
    match color {
        TshirtColor::White => {
            "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=400&h=500&fit=crop&crop=center"
        }
        TshirtColor::Black => {
            "https://images.unsplash.com/photo-1503341504253-dff4815485f1?w=400&h=500&fit=crop&crop=center"
        }
        TshirtColor::Navy => {
            "https://images.unsplash.com/photo-1618354691373-d851c5c3a990?w=400&h=500&fit=crop&crop=center"
        }
        TshirtColor::Gray => {
            "https://images.unsplash.com/photo-1576566588028-4147f3842f27?w=400&h=500&fit=crop&crop=center"
        }
    }
}

/// Template catalog with optional per-color configuration overrides
pub struct TemplateCatalog {
    overrides: HashMap<TshirtColor, String>,
}

impl TemplateCatalog {
    /// Build from configuration; override keys that are not palette
    /// colors are ignored with a warning
    pub fn from_config(config: &memetee_config::MockupConfig) -> Self {
        let mut overrides = HashMap::new();
        for (name, url) in &config.templates {
            match name.parse::<TshirtColor>() {
                Ok(color) => {
                    overrides.insert(color, url.clone());
                }
                Err(_) => {
                    tracing::warn!(color = %name, "ignoring template override for unknown color");
                }
            }
        }
        Self { overrides }
    }

    /// Template image for a shirt color
    pub fn template(&self, color: TshirtColor) -> String {
        self.overrides
            .get(&color)
            .cloned()
            .unwrap_or_else(|| builtin_template(color).to_owned())
    }

    /// Fixed fallback template for invalid requests
    pub fn placeholder(&self) -> String {
        self.template(TshirtColor::default())
    }
}
