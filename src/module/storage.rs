//! Attribute storage
//!
//! Binds string fields of a type to the attributes of a markup element through
//! an explicit accessor table, so content types (conditions in particular) can
//! be built from markup and written back out.
//!
//! ```
//! use modhost::attribute_storage;
//! use modhost::module::api::{read_element, write_element, ElementInfo};
//!
//! #[derive(Default)]
//! struct OnDelete {
//!     computer: Option<String>,
//!     file: Option<String>,
//! }
//!
//! attribute_storage!(OnDelete as "OnDelete" {
//!     computer => "Computer",
//!     file => "File",
//! });
//!
//! let mut condition = OnDelete::default();
//! read_element(&mut condition, &ElementInfo::new("OnDelete").with_attribute("Computer", "mainframe"));
//! assert_eq!(write_element(&condition), r#"<OnDelete Computer="mainframe"/>"#);
//! ```

use crate::module::types::ElementInfo;

/// One attribute binding: the attribute name and how to read and write it
pub struct AttributeField<T> {
    pub name: &'static str,
    pub get: fn(&T) -> Option<String>,
    pub set: fn(&mut T, Option<String>),
}

/// Types whose fields map onto the attributes of one markup element
pub trait AttributeStorage {
    /// Element name written by [`write_element`]
    fn element_name() -> &'static str;

    /// Accessor table, in attribute order
    fn fields() -> Vec<AttributeField<Self>>
    where
        Self: Sized;
}

/// Implement [`AttributeStorage`] for a struct with `Option<String>` fields
#[macro_export]
macro_rules! attribute_storage {
    ($ty:ty as $element:literal { $($field:ident => $attr:literal),* $(,)? }) => {
        impl $crate::module::api::AttributeStorage for $ty {
            fn element_name() -> &'static str {
                $element
            }

            fn fields() -> Vec<$crate::module::api::AttributeField<Self>> {
                vec![
                    $(
                        $crate::module::api::AttributeField {
                            name: $attr,
                            get: |obj: &Self| obj.$field.clone(),
                            set: |obj: &mut Self, value: Option<String>| obj.$field = value,
                        },
                    )*
                ]
            }
        }
    };
}

/// Serialise `obj` as a single self-closing element; unset fields are omitted
pub fn write_element<T: AttributeStorage>(obj: &T) -> String {
    let mut out = format!("<{}", T::element_name());
    for field in T::fields() {
        if let Some(value) = (field.get)(obj) {
            out.push_str(&format!(" {}=\"{}\"", field.name, escape(&value)));
        }
    }
    out.push_str("/>");
    out
}

/// Set every bound field from `element`; missing attributes become `None`
pub fn read_element<T: AttributeStorage>(obj: &mut T, element: &ElementInfo) {
    if element.name != T::element_name() {
        log::debug!(
            "Reading <{}> into storage for <{}>",
            element.name,
            T::element_name()
        );
    }
    for field in T::fields() {
        (field.set)(obj, element.attribute(field.name).map(str::to_string));
    }
}

/// Build a fresh value from `element`
pub fn from_element<T: AttributeStorage + Default>(element: &ElementInfo) -> T {
    let mut obj = T::default();
    read_element(&mut obj, element);
    obj
}

/// The element `obj` would be written as
pub fn to_element<T: AttributeStorage>(obj: &T) -> ElementInfo {
    let mut element = ElementInfo::new(T::element_name());
    for field in T::fields() {
        if let Some(value) = (field.get)(obj) {
            element.set_attribute(field.name, value);
        }
    }
    element
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
