//! Lithology keyword classification.

use crate::types::GrainClass;

impl GrainClass {
    /// Classifies a lithology keyword.
    ///
    /// Matching ignores case and surrounding whitespace; only the exact
    /// phrases below are recognised.
    ///
    /// | keyword | class |
    /// |---|---|
    /// | `fine grain` | [`GrainClass::Fine`] |
    /// | `mix grain`, `mixed grain` | [`GrainClass::Mixed`] |
    /// | `coarse grain` | [`GrainClass::Coarse`] |
    ///
    /// # Examples
    ///
    /// ```
    /// use ttemkit_core::types::GrainClass;
    ///
    /// assert_eq!(GrainClass::from_keyword(" Fine Grain "), GrainClass::Fine);
    /// assert_eq!(GrainClass::from_keyword("clay").code(), 0);
    /// ```
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.trim().to_lowercase().as_str() {
            "fine grain" => Self::Fine,
            "mix grain" | "mixed grain" => Self::Mixed,
            "coarse grain" => Self::Coarse,
            _ => Self::Unclassified,
        }
    }
}
