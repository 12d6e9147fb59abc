use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Text that is not blank: it contains at least one non-whitespace character.
///
/// The text is stored as given, surrounding whitespace included.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct PresentText(String);

/// Whether `text` counts as present, i.e. is neither empty nor whitespace only.
#[must_use]
pub fn is_present(text: &str) -> bool {
    !text.trim().is_empty()
}

impl PresentText {
    #[must_use]
    pub fn new(text: String) -> Option<Self> {
        is_present(&text).then_some(Self(text))
    }

    #[must_use]
    pub fn new_unchecked(text: String) -> Self {
        Self::new(text).expect("Text was blank.")
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for PresentText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The text is blank: {0:?}")]
pub struct BlankTextError(String);

impl BlankTextError {
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for PresentText {
    type Error = BlankTextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_present(&value) {
            Ok(Self(value))
        } else {
            Err(BlankTextError(value))
        }
    }
}

impl<'de> Deserialize<'de> for PresentText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        PresentText::try_from(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"non-blank text"))
    }
}

#[cfg(test)]
mod tests {
    use crate::util::{BlankTextError, PresentText, is_present};

    #[test]
    fn presence() {
        let present = ["a", "Alice", "  padded  ", "\tx\n", "0"];
        let blank = ["", " ", "   ", "\t\n", "\u{3000}"];

        for text in present {
            assert!(is_present(text), "{text:?} should be present");
            assert!(PresentText::new(text.to_owned()).is_some());
        }
        for text in blank {
            assert!(!is_present(text), "{text:?} should be blank");
            assert!(PresentText::new(text.to_owned()).is_none());
        }
    }

    #[test]
    fn keeps_text_verbatim() {
        let text = PresentText::new_unchecked("  Nice post!  ".to_owned());
        assert_eq!(text.get(), "  Nice post!  ");
        assert_eq!(text.to_string(), "  Nice post!  ");
        assert_eq!(text.into_inner(), "  Nice post!  ");
    }

    #[test]
    fn try_from_returns_rejected_text() {
        let err = PresentText::try_from(" ".to_owned()).unwrap_err();
        assert_eq!(err, BlankTextError(" ".to_owned()));
        assert_eq!(err.into_inner(), " ");
    }

    #[test]
    fn deserialize() {
        let text: PresentText = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(text.get(), "hello");

        assert!(serde_json::from_str::<PresentText>(r#""""#).is_err());
        assert!(serde_json::from_str::<PresentText>(r#""  ""#).is_err());
    }
}
