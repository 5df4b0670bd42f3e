//! Song metadata tags.

use alloc::string::String;

/// A `LABEL:DATA` line kept verbatim so it can be written back on save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub label: String,
    pub data: String,
}

impl Tag {
    pub fn new(label: &str, data: &str) -> Self {
        Self {
            label: String::from(label),
            data: String::from(data),
        }
    }
}
