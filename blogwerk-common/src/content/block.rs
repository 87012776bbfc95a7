use crate::content::Directive;
use serde::{Deserialize, Serialize};

pub const TOP_PICKS_BLOCK_NAME: &str = "Top Picks";
pub const QUOTE_BLOCK_NAME: &str = "Quote";

pub const NO_PRODUCTS_PLACEHOLDER: &str = "No products specified";
pub const NO_QUOTE_PLACEHOLDER: &str = "No quote provided";

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Block {
    TopPicks {
        image: Option<String>,
        products: String,
    },
    Quote {
        text: String,
        author: Option<String>,
    },
    Unknown {
        name: String,
    },
}

impl Block {
    #[must_use]
    pub fn resolve(directive: &Directive) -> Self {
        let owned = |key: &str| directive.attribute(key).map(str::to_owned);

        match directive.name.as_str() {
            TOP_PICKS_BLOCK_NAME => Self::TopPicks {
                image: owned("image"),
                products: owned("products").unwrap_or_else(|| NO_PRODUCTS_PLACEHOLDER.to_owned()),
            },
            QUOTE_BLOCK_NAME => Self::Quote {
                text: owned("text").unwrap_or_else(|| NO_QUOTE_PLACEHOLDER.to_owned()),
                author: owned("author"),
            },
            name => Self::Unknown {
                name: name.to_owned(),
            },
        }
    }
}

impl From<&Directive> for Block {
    fn from(value: &Directive) -> Self {
        Self::resolve(value)
    }
}
