use crate::catalog::RemoteCatalogRecord;

/// Extension of every stub written into a library.
pub const STUB_EXTENSION: &str = "mkv";

/// Strategy for naming destination folders and stub files.
///
/// Implementations must be pure: the same record always yields the same
/// name, otherwise re-runs would create duplicate folders instead of reusing
/// the existing ones.
pub trait NamingStrategy: Send + Sync {
    fn folder_name(&self, record: &RemoteCatalogRecord) -> String;
    fn file_name(&self, record: &RemoteCatalogRecord) -> String;
}

/// `Title (Year) [tmdbid-123]` for movies, `Title (Year) [tvdbid-456]` for
/// series.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamingStrategy;

impl DefaultNamingStrategy {
    /// Replace every character that is illegal in a file name on common
    /// filesystems with `_`, then trim surrounding whitespace. A result made
    /// only of dots would name the current or parent directory, so its dots
    /// become `_` as well.
    pub fn sanitize(&self, s: &str) -> String {
        let cleaned = s
            .chars()
            .map(|c| if is_illegal(c) { '_' } else { c })
            .collect::<String>()
            .trim()
            .to_string();
        if !cleaned.is_empty() && cleaned.chars().all(|c| c == '.') {
            return "_".repeat(cleaned.len());
        }
        cleaned
    }
}

fn is_illegal(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control()
}

impl NamingStrategy for DefaultNamingStrategy {
    fn folder_name(&self, record: &RemoteCatalogRecord) -> String {
        let mut name = self.sanitize(&record.title);
        if name.is_empty() {
            name = record.kind.unknown_title().to_string();
        }
        if let Some(year) = record.year {
            name = format!("{} ({})", name, year);
        }
        if let Some(id) = record.ids.tag_value(record.kind) {
            name = format!("{} [{}-{}]", name, record.kind.id_tag(), self.sanitize(id));
        }
        name
    }

    fn file_name(&self, record: &RemoteCatalogRecord) -> String {
        format!("{}.{}", self.folder_name(record), STUB_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogKind, ExternalIds};

    fn record(title: &str, year: Option<i32>, kind: CatalogKind) -> RemoteCatalogRecord {
        RemoteCatalogRecord {
            title: title.to_string(),
            year,
            kind,
            runtime_minutes: None,
            ids: ExternalIds {
                simkl: Some(1),
                tmdb: Some("438631".into()),
                tvdb: Some("81189".into()),
                imdb: None,
            },
        }
    }

    #[test]
    fn movie_names_carry_tmdb_id() {
        let naming = DefaultNamingStrategy;
        let dune = record("Dune", Some(2021), CatalogKind::Movie);

        assert_eq!(naming.folder_name(&dune), "Dune (2021) [tmdbid-438631]");
        assert_eq!(naming.file_name(&dune), "Dune (2021) [tmdbid-438631].mkv");
    }

    #[test]
    fn series_names_carry_tvdb_id() {
        let naming = DefaultNamingStrategy;
        let show = record("Breaking Bad", Some(2008), CatalogKind::Show);
        let anime = record("Frieren", None, CatalogKind::AnimeTv);

        assert_eq!(naming.folder_name(&show), "Breaking Bad (2008) [tvdbid-81189]");
        assert_eq!(naming.folder_name(&anime), "Frieren [tvdbid-81189]");
    }

    #[test]
    fn missing_parts_are_omitted() {
        let naming = DefaultNamingStrategy;
        let mut bare = record("Akira", None, CatalogKind::AnimeMovie);
        bare.ids.tmdb = Some("   ".into());

        assert_eq!(naming.folder_name(&bare), "Akira");
        bare.title = " ".into();
        assert_eq!(naming.folder_name(&bare), "Unknown Anime Movie");
    }

    #[test]
    fn illegal_characters_become_underscores() {
        let naming = DefaultNamingStrategy;

        assert_eq!(naming.sanitize("Face/Off"), "Face_Off");
        assert_eq!(naming.sanitize("What? Why: <Now>|"), "What_ Why_ _Now__");
        assert_eq!(naming.sanitize("  \"Quoted\"  "), "_Quoted_");
        assert_eq!(naming.sanitize("Tab\u{7}bell"), "Tab_bell");
    }

    #[test]
    fn dot_only_titles_cannot_escape_the_library() {
        let naming = DefaultNamingStrategy;
        let mut dots = record("..", None, CatalogKind::Movie);
        dots.ids = ExternalIds::default();

        assert_eq!(naming.sanitize("."), "_");
        assert_eq!(naming.sanitize(" .. "), "__");
        assert_eq!(naming.sanitize("..."), "___");
        assert_eq!(naming.sanitize("Mr. Robot"), "Mr. Robot");
        assert_eq!(naming.folder_name(&dots), "__");
        assert_eq!(naming.file_name(&dots), "__.mkv");

        dots.title = ".".into();
        assert_eq!(naming.folder_name(&dots), "_");
    }

    #[test]
    fn names_are_deterministic() {
        let naming = DefaultNamingStrategy;
        let item = record("Mission: Impossible", Some(1996), CatalogKind::Movie);

        let first = naming.folder_name(&item);
        for _ in 0..3 {
            assert_eq!(naming.folder_name(&item), first);
        }
        assert_eq!(first, "Mission_ Impossible (1996) [tmdbid-438631]");
    }
}
