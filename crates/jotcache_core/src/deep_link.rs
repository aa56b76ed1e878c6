//! URL activation routes.
//!
//! # Responsibility
//! - Parse `jotcache://edit?id=<uuid>` into an open-note request.
//! - Build the same URL for widgets and share targets.
//!
//! # Invariants
//! - Anything that is not a well-formed edit URL with a valid UUID parses to
//!   `None`; parsing never fails loudly.

use crate::model::note::NoteId;
use url::Url;
use uuid::fmt::Hyphenated;
use uuid::Uuid;

/// URL scheme registered for the app.
pub const URL_SCHEME: &str = "jotcache";
const EDIT_TARGET: &str = "edit";
const ID_PARAM: &str = "id";

/// Parsed activation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeepLink {
    OpenNote(NoteId),
}

impl DeepLink {
    /// Parses an activation URL.
    ///
    /// The target is the host when present, otherwise the path with every
    /// `/` removed, so `jotcache://edit?id=…`, `jotcache:///edit?id=…` and
    /// `jotcache:edit?id=…` are equivalent. Query values are percent-decoded;
    /// only the hyphenated UUID form is accepted as an id.
    pub fn parse(url: &str) -> Option<Self> {
        let url = Url::parse(url.trim()).ok()?;
        if !url.scheme().eq_ignore_ascii_case(URL_SCHEME) {
            return None;
        }

        let target = match url.host_str().filter(|host| !host.is_empty()) {
            Some(host) => host.to_string(),
            None => url.path().replace('/', ""),
        };
        if target != EDIT_TARGET {
            return None;
        }

        let raw_id = url
            .query_pairs()
            .find(|(name, _)| name == ID_PARAM)
            .map(|(_, value)| value.into_owned())?;
        parse_hyphenated(&raw_id).map(Self::OpenNote)
    }

    pub fn note_id(&self) -> NoteId {
        match self {
            Self::OpenNote(id) => *id,
        }
    }

    pub fn to_url(&self) -> String {
        match self {
            Self::OpenNote(id) => format!("{URL_SCHEME}://{EDIT_TARGET}?{ID_PARAM}={id}"),
        }
    }
}

/// Accepts `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` only, in either case.
fn parse_hyphenated(raw: &str) -> Option<Uuid> {
    if raw.len() != Hyphenated::LENGTH {
        return None;
    }
    Uuid::try_parse(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::DeepLink;
    use uuid::Uuid;

    const ID: &str = "7b0f6c2e-3f4a-4c1d-9a55-2b8e7f1d0c11";

    #[test]
    fn parses_host_and_path_targets() {
        let id = Uuid::parse_str(ID).unwrap();
        for url in [
            format!("jotcache://edit?id={ID}"),
            format!("jotcache:///edit?id={ID}"),
            format!("jotcache:edit?id={ID}"),
            format!("jotcache://edit?foo=1&id={}", ID.to_uppercase()),
            format!("JOTCACHE://edit?id={ID}#frag"),
        ] {
            assert_eq!(DeepLink::parse(&url), Some(DeepLink::OpenNote(id)), "{url}");
        }
    }

    #[test]
    fn rejects_wrong_scheme_target_or_id() {
        for url in [
            format!("https://edit?id={ID}"),
            format!("jotcache://view?id={ID}"),
            "jotcache://edit".to_string(),
            "jotcache://edit?id=".to_string(),
            "jotcache://edit?id=not-a-uuid".to_string(),
            format!("jotcache://edit?note={ID}"),
            "not a url".to_string(),
        ] {
            assert_eq!(DeepLink::parse(&url), None, "{url}");
        }
    }

    #[test]
    fn percent_encoded_id_is_decoded() {
        let id = Uuid::parse_str(ID).unwrap();
        let url = "jotcache://edit?id=7b0f6c2e%2D3f4a-4c1d-9a55-2b8e7f1d0c11";
        assert_eq!(DeepLink::parse(url), Some(DeepLink::OpenNote(id)));
    }

    #[test]
    fn only_hyphenated_ids_are_accepted() {
        for url in [
            "jotcache://edit?id=7b0f6c2e3f4a4c1d9a552b8e7f1d0c11",
            "jotcache://edit?id={7b0f6c2e-3f4a-4c1d-9a55-2b8e7f1d0c11}",
            "jotcache://edit?id=urn:uuid:7b0f6c2e-3f4a-4c1d-9a55-2b8e7f1d0c11",
        ] {
            assert_eq!(DeepLink::parse(url), None, "{url}");
        }
    }

    #[test]
    fn built_url_parses_back() {
        let link = DeepLink::OpenNote(Uuid::new_v4());
        assert_eq!(DeepLink::parse(&link.to_url()), Some(link));
        assert_eq!(DeepLink::parse(&link.to_url()).unwrap().note_id(), link.note_id());
    }
}
