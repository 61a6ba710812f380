//! String conversion utilities.

/// Converts an empty string to `None`, otherwise returns `Some(value)`.
///
/// Graph properties written from defaulted fields are stored as empty strings;
/// this turns them back into absent values.
///
/// # Examples
///
/// ```
/// use storygraph_domain::common::none_if_empty;
///
/// assert_eq!(none_if_empty("hello"), Some("hello"));
/// assert_eq!(none_if_empty(""), None);
/// assert_eq!(none_if_empty(" "), Some(" ")); // Whitespace is not empty
/// ```
pub fn none_if_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Owned version of [`none_if_empty`] for when you have a `String`.
pub fn some_if_not_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Extension trait for strings providing `into_option` as a method.
///
/// ```
/// use storygraph_domain::common::StringExt;
///
/// assert_eq!("p1".to_string().into_option(), Some("p1".to_string()));
/// assert_eq!(String::new().into_option(), None);
/// ```
pub trait StringExt {
    /// Converts this string to `None` if empty, otherwise `Some(self)`.
    fn into_option(self) -> Option<String>;
}

impl StringExt for String {
    fn into_option(self) -> Option<String> {
        some_if_not_empty(self)
    }
}
