//! Enumerated catalog values stored as `TEXT` columns with `CHECK` constraints.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(CoreError::UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

text_enum!(SentimentLabel, "sentiment", {
    Negative => "negative",
    Neutral => "neutral",
    Positive => "positive",
    Other => "other",
});

text_enum!(Licensability, "licensability", {
    Unlikely => "unlikely",
    VeryUnlikely => "veryunlikely",
    Likely => "likely",
    VeryLikely => "verylikely",
    Other => "other",
});

text_enum!(LinkSource, "link source", {
    Parsed => "parsed",
    Generated => "generated",
    GoogleUrlTool => "google_url_tool",
    Apollo => "apollo",
    NotFound => "notfound",
    Other => "other",
});

text_enum!(FixedEntityType, "fixed entity type", {
    Product => "product",
    Person => "person",
    Company => "company",
    Event => "event",
    Government => "government",
    Educational => "educational",
    Ngo => "ngo",
    Other => "other",
});
