//! Solid selection by index or path

use sm_kernel::Shape;

use crate::error::{ConvertError, ConvertResult};
use crate::walker::NamedSolid;

/// A parsed selection token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionToken {
    /// 1-based position in the flattened list
    Index(i64),
    /// Exact full path (starts with `/`)
    Path(String),
}

impl SelectionToken {
    /// Classify a raw token
    ///
    /// Returns `Ok(None)` for an empty token, which selects nothing.
    pub fn parse(token: &str) -> ConvertResult<Option<Self>> {
        if token.is_empty() {
            return Ok(None);
        }
        if token.starts_with('/') {
            return Ok(Some(SelectionToken::Path(token.to_string())));
        }
        token
            .trim()
            .parse::<i64>()
            .map(|index| Some(SelectionToken::Index(index)))
            .map_err(|_| ConvertError::InvalidIndex(token.to_string()))
    }

    /// Resolve the token against the flattened solids
    fn resolve<'a>(&self, named: &'a [NamedSolid]) -> ConvertResult<&'a NamedSolid> {
        match self {
            SelectionToken::Path(path) => named
                .iter()
                .find(|solid| solid.name == *path)
                .ok_or_else(|| ConvertError::NotFound(path.clone())),
            SelectionToken::Index(index) => usize::try_from(*index)
                .ok()
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| named.get(i))
                .ok_or(ConvertError::IndexOutOfRange(*index)),
        }
    }
}

/// Pick solids by index or path
///
/// With no tokens every solid is returned in order. Otherwise the result
/// follows the token order; a solid selected twice appears twice.
pub fn select<S: AsRef<str>>(named: &[NamedSolid], tokens: &[S]) -> ConvertResult<Vec<Shape>> {
    if tokens.is_empty() {
        return Ok(named.iter().map(|n| n.solid.clone()).collect());
    }

    let mut selected = Vec::with_capacity(tokens.len());
    for token in tokens {
        let Some(token) = SelectionToken::parse(token.as_ref())? else {
            continue;
        };
        let solid = token.resolve(named)?;
        tracing::debug!("Selected {}", solid.name);
        selected.push(solid.solid.clone());
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sm_kernel::ShapeType;
    use uuid::Uuid;

    fn named(names: &[&str]) -> Vec<NamedSolid> {
        names
            .iter()
            .map(|name| NamedSolid {
                solid: Shape::new(Uuid::new_v4(), ShapeType::Solid),
                name: name.to_string(),
            })
            .collect()
    }

    fn ids(shapes: &[Shape]) -> Vec<Uuid> {
        shapes.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!(SelectionToken::parse("").unwrap(), None);
        assert_eq!(
            SelectionToken::parse("/A/B").unwrap(),
            Some(SelectionToken::Path("/A/B".into()))
        );
        assert_eq!(
            SelectionToken::parse(" 3 ").unwrap(),
            Some(SelectionToken::Index(3))
        );
        assert_eq!(
            SelectionToken::parse("-2").unwrap(),
            Some(SelectionToken::Index(-2))
        );
        assert!(matches!(
            SelectionToken::parse("abc"),
            Err(ConvertError::InvalidIndex(t)) if t == "abc"
        ));
        assert!(SelectionToken::parse("2x").is_err());
    }

    #[test]
    fn test_no_tokens_selects_all() {
        let solids = named(&["/1", "/2", "/3"]);
        let selected = select::<&str>(&solids, &[]).unwrap();
        assert_eq!(
            ids(&selected),
            solids.iter().map(|s| s.solid.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_select_by_index() {
        let solids = named(&["/1", "/2", "/3"]);
        let selected = select(&solids, &["2"]).unwrap();
        assert_eq!(ids(&selected), vec![solids[1].solid.id]);
    }

    #[test]
    fn test_index_out_of_range() {
        let solids = named(&["/1", "/2"]);
        assert!(matches!(
            select(&solids, &["0"]),
            Err(ConvertError::IndexOutOfRange(0))
        ));
        assert!(matches!(
            select(&solids, &["3"]),
            Err(ConvertError::IndexOutOfRange(3))
        ));
        assert!(matches!(
            select(&solids, &["-1"]),
            Err(ConvertError::IndexOutOfRange(-1))
        ));
    }

    #[test]
    fn test_invalid_index() {
        let solids = named(&["/1"]);
        assert!(matches!(
            select(&solids, &["abc"]),
            Err(ConvertError::InvalidIndex(_))
        ));
    }

    #[test]
    fn test_select_by_path() {
        let solids = named(&["/Asm/Part", "/Asm/Sub/Part"]);
        let selected = select(&solids, &["/Asm/Sub/Part"]).unwrap();
        assert_eq!(ids(&selected), vec![solids[1].solid.id]);

        let err = select(&solids, &["/Asm/Other"]).unwrap_err();
        assert_eq!(err.to_string(), "Could not find solid with name '/Asm/Other'");
    }

    #[test]
    fn test_path_takes_first_match() {
        let solids = named(&["/Asm/Part", "/Asm/Part"]);
        let selected = select(&solids, &["/Asm/Part"]).unwrap();
        assert_eq!(ids(&selected), vec![solids[0].solid.id]);
    }

    #[test]
    fn test_order_and_duplicates_follow_tokens() {
        let solids = named(&["/1", "/2"]);
        let selected = select(&solids, &["2", "", "1", "2"]).unwrap();
        assert_eq!(
            ids(&selected),
            vec![solids[1].solid.id, solids[0].solid.id, solids[1].solid.id]
        );
    }

    #[test]
    fn test_only_empty_tokens_selects_nothing() {
        let solids = named(&["/1"]);
        assert!(select(&solids, &["", ""]).unwrap().is_empty());
    }
}
