use serde::Deserialize;

/// A resolved coordinate pair. Absence of a pair (unresolved) is expressed
/// as `None` by callers, never as `(0, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Status code the service uses for "no usable match for this query".
pub(crate) const NO_MATCH_CODE: &str = "018";

/// Raw geocode.xyz-style response. Coordinates arrive as strings; a miss is
/// signalled either by an error code or by a non-numeric `latt`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlaceResponse {
    pub latt: Option<String>,
    pub longt: Option<String>,
    pub code: Option<String>,
    pub error: Option<ErrorBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBlock {
    pub code: Option<String>,
}

impl PlaceResponse {
    /// Map the wire shape to an outcome: `Some` for a usable pair, `None`
    /// for anything the service reports as a miss.
    pub fn into_match(self) -> Option<Coordinates> {
        let miss = |code: &Option<String>| code.as_deref() == Some(NO_MATCH_CODE);
        if miss(&self.code) || self.error.as_ref().is_some_and(|e| miss(&e.code)) {
            return None;
        }
        let latitude: f64 = self.latt?.parse().ok()?;
        let longitude: f64 = self.longt?.parse().ok()?;
        Some(Coordinates {
            latitude,
            longitude,
        })
    }
}
