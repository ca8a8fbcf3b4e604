use serde::{Deserialize, Serialize};

use super::MediaType;

pub const DEFAULT_MANIFEST_ID: &str = "org.imdbwatchlist";
pub const DEFAULT_MANIFEST_NAME: &str = "IMDB Watchlist Add-on";

/// Genres offered as catalog filters, in display order
pub const GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Biography",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "Film-Noir",
    "History",
    "Horror",
    "Music",
    "Musical",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Short",
    "Sport",
    "Thriller",
    "War",
    "Western",
];

/// Add-on manifest advertised to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub resources: Vec<String>,
    pub types: Vec<MediaType>,
    pub catalogs: Vec<Catalog>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Catalog {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub genres: Vec<String>,
    pub extra: Vec<CatalogExtra>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogExtra {
    pub name: String,
}

impl Catalog {
    /// Catalog listing the watchlist entries of one media type
    pub fn watchlist(media_type: MediaType) -> Self {
        let name = match media_type {
            MediaType::Movie => "IMDB Movie Watchlist",
            MediaType::Series => "IMDB Series Watchlist",
        };

        Self {
            id: format!("imdb-{}-list", media_type),
            name: name.to_string(),
            media_type,
            genres: GENRES.iter().map(|g| g.to_string()).collect(),
            extra: ["genre", "skip"]
                .iter()
                .map(|name| CatalogExtra {
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            id: DEFAULT_MANIFEST_ID.to_string(),
            version: "0.0.1".to_string(),
            name: DEFAULT_MANIFEST_NAME.to_string(),
            description: "Add-on to create a catalog of a IMDB user watchlist.".to_string(),
            resources: vec!["catalog".to_string()],
            types: vec![MediaType::Movie, MediaType::Series],
            catalogs: vec![
                Catalog::watchlist(MediaType::Movie),
                Catalog::watchlist(MediaType::Series),
            ],
        }
    }
}

impl Manifest {
    /// Returns a copy of this manifest branded with a user's list name
    ///
    /// The id gets the username appended so clients treat each user's add-on
    /// as a separate installation.
    pub fn personalized(&self, username: &str, list_name: &str) -> Self {
        let mut manifest = self.clone();
        manifest.id = format!("{}{}", self.id, username);
        manifest.name = list_name.to_string();
        for catalog in &mut manifest.catalogs {
            catalog.name = list_name.to_string();
        }
        manifest
    }
}
