use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Lowercases an artist name and collapses whitespace runs into `-`, so
/// "Vincent  van Gogh" and "vincent-van-gogh" resolve to the same key.
pub fn normalize_artist_name(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtistNode {
    pub movement: Option<String>,
    pub related: Vec<String>,
    pub influenced_by: Vec<String>,
    pub influenced: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenreNode {
    pub subgenres: Vec<String>,
    pub related: Vec<String>,
}

/// Cold-start preferences for one personality seed type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedPreferences {
    pub artists: Vec<String>,
    pub genres: Vec<String>,
    pub movements: Vec<String>,
}

/// Where a genre sits in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenreLocation<'a> {
    /// `None` when the genre is itself a top-level family.
    pub parent: Option<&'a str>,
    pub related: &'a [String],
}

/// Read-only relation graph over artists and genres, plus the per-type
/// cold-start table. Injected into the engine as `Arc<PreferenceGraph>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceGraph {
    pub version: u32,
    pub artists: BTreeMap<String, ArtistNode>,
    pub genres: BTreeMap<String, GenreNode>,
    pub seeds: BTreeMap<String, SeedPreferences>,
    /// Alternate names for seed types, e.g. "collector-seed" -> "LAMC".
    pub seed_aliases: BTreeMap<String, String>,
}

impl PreferenceGraph {
    /// Loads a graph from a `.toml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preference graph: {:?}", path))?;
        let mut graph: PreferenceGraph = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .with_context(|| format!("Failed to parse preference graph: {:?}", path))?,
            Some("json") => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse preference graph: {:?}", path))?,
            other => bail!("Unsupported preference graph format: {:?}", other),
        };
        graph.normalize_artist_keys()?;
        graph.check()?;
        Ok(graph)
    }

    /// Rewrites every artist name (node keys, relation lists, seed artists)
    /// into its normalized key, so hand-written files may use display names.
    fn normalize_artist_keys(&mut self) -> Result<()> {
        let normalize_all = |names: &mut Vec<String>| {
            for name in names.iter_mut() {
                *name = normalize_artist_name(name);
            }
        };
        let mut artists = BTreeMap::new();
        for (name, mut node) in std::mem::take(&mut self.artists) {
            normalize_all(&mut node.related);
            normalize_all(&mut node.influenced_by);
            normalize_all(&mut node.influenced);
            let key = normalize_artist_name(&name);
            if artists.insert(key.clone(), node).is_some() {
                bail!("Artist '{}' is listed more than once as '{}'", name, key);
            }
        }
        self.artists = artists;
        for seed in self.seeds.values_mut() {
            normalize_all(&mut seed.artists);
        }
        Ok(())
    }

    fn check(&self) -> Result<()> {
        for (alias, target) in &self.seed_aliases {
            if !self.seeds.contains_key(target) {
                bail!("Seed alias '{}' points to unknown seed type '{}'", alias, target);
            }
        }
        Ok(())
    }

    pub fn artist(&self, name: &str) -> Option<&ArtistNode> {
        self.artists.get(&normalize_artist_name(name))
    }

    pub fn related_artists_of(&self, name: &str) -> &[String] {
        self.artist(name)
            .map(|node| node.related.as_slice())
            .unwrap_or(&[])
    }

    /// Scans the top-level families. A direct family match has no parent and
    /// carries its own related set; a subgenre match carries its parent and
    /// the parent's related set.
    pub fn locate_genre(&self, genre: &str) -> Option<GenreLocation<'_>> {
        if let Some(node) = self.genres.get(genre) {
            return Some(GenreLocation {
                parent: None,
                related: &node.related,
            });
        }
        self.genres.iter().find_map(|(parent, node)| {
            node.subgenres
                .iter()
                .any(|sub| sub == genre)
                .then(|| GenreLocation {
                    parent: Some(parent.as_str()),
                    related: &node.related,
                })
        })
    }

    /// Resolves a seed type by code or alias. Codes match case-insensitively.
    pub fn seed(&self, seed_type: &str) -> Option<&SeedPreferences> {
        if let Some(seed) = self.seeds.get(seed_type) {
            return Some(seed);
        }
        if let Some(target) = self.seed_aliases.get(seed_type) {
            return self.seeds.get(target);
        }
        self.seeds.get(&seed_type.to_uppercase())
    }

    /// The canonical code for a seed type or alias.
    pub fn canonical_seed_type(&self, seed_type: &str) -> Option<String> {
        if self.seeds.contains_key(seed_type) {
            return Some(seed_type.to_string());
        }
        if let Some(target) = self.seed_aliases.get(seed_type) {
            return Some(target.clone());
        }
        let upper = seed_type.to_uppercase();
        self.seeds.contains_key(&upper).then_some(upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tiny_graph() -> PreferenceGraph {
        let mut graph = PreferenceGraph::default();
        graph.artists.insert(
            "a".to_string(),
            ArtistNode {
                movement: Some("m".to_string()),
                related: vec!["b".to_string()],
                influenced_by: vec!["c".to_string()],
                influenced: vec![],
            },
        );
        graph.genres.insert(
            "family".to_string(),
            GenreNode {
                subgenres: vec!["child".to_string()],
                related: vec!["cousin".to_string()],
            },
        );
        graph
    }

    #[test]
    fn normalizes_artist_names() {
        assert_eq!(normalize_artist_name("Van Gogh"), "van-gogh");
        assert_eq!(normalize_artist_name("  Lucian   Freud "), "lucian-freud");
        assert_eq!(normalize_artist_name("monet"), "monet");
    }

    #[test]
    fn top_level_genre_has_no_parent() {
        let graph = tiny_graph();
        let location = graph.locate_genre("family").unwrap();
        assert_eq!(location.parent, None);
        assert_eq!(location.related, &["cousin".to_string()]);
    }

    #[test]
    fn subgenre_resolves_to_parent() {
        let graph = tiny_graph();
        let location = graph.locate_genre("child").unwrap();
        assert_eq!(location.parent, Some("family"));
        assert_eq!(location.related, &["cousin".to_string()]);
        assert!(graph.locate_genre("unknown").is_none());
    }

    #[test]
    fn artist_lookup_normalizes() {
        let graph = tiny_graph();
        assert!(graph.artist("A").is_some());
        assert_eq!(graph.related_artists_of("A"), &["b".to_string()]);
        assert!(graph.related_artists_of("nobody").is_empty());
    }

    #[test]
    fn loads_toml_and_json() {
        let dir = TempDir::new().unwrap();
        let toml_path = dir.path().join("graph.toml");
        std::fs::write(
            &toml_path,
            r#"
version = 3

[artists.a]
movement = "m"
related = ["b"]

[genres.family]
subgenres = ["child"]

[seeds.TEST]
artists = ["a"]
genres = ["family"]

[seed_aliases]
tester = "TEST"
"#,
        )
        .unwrap();
        let graph = PreferenceGraph::load(&toml_path).unwrap();
        assert_eq!(graph.version, 3);
        assert_eq!(graph.related_artists_of("a"), &["b".to_string()]);
        assert_eq!(graph.seed("tester").unwrap().artists, vec!["a".to_string()]);

        let json_path = dir.path().join("graph.json");
        std::fs::write(&json_path, serde_json::to_string(&graph).unwrap()).unwrap();
        assert_eq!(PreferenceGraph::load(&json_path).unwrap(), graph);
    }

    #[test]
    fn loaded_artist_names_are_normalized() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.toml");
        std::fs::write(
            &path,
            r#"
[artists."Van Gogh"]
related = ["Paul Gauguin"]
influenced_by = ["Jean-Francois Millet"]

[seeds.TEST]
artists = ["Van Gogh"]
"#,
        )
        .unwrap();
        let graph = PreferenceGraph::load(&path).unwrap();
        assert!(graph.artists.contains_key("van-gogh"));
        assert!(graph.artist("van gogh").is_some());
        assert_eq!(graph.related_artists_of("Van Gogh"), &["paul-gauguin".to_string()]);
        assert_eq!(
            graph.artist("van-gogh").unwrap().influenced_by,
            vec!["jean-francois-millet".to_string()]
        );
        assert_eq!(graph.seed("TEST").unwrap().artists, vec!["van-gogh".to_string()]);
    }

    #[test]
    fn rejects_artists_that_collide_after_normalizing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.toml");
        std::fs::write(&path, "[artists.\"Van Gogh\"]\n[artists.van-gogh]\n").unwrap();
        assert!(PreferenceGraph::load(&path).is_err());
    }

    #[test]
    fn rejects_dangling_alias() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.toml");
        std::fs::write(&path, "[seed_aliases]\nghost = \"NOPE\"\n").unwrap();
        assert!(PreferenceGraph::load(&path).is_err());
    }
}
