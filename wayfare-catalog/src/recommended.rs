use async_trait::async_trait;
use std::collections::HashSet;
use wayfare_core::repository::{RepoError, TemplateCatalog};
use wayfare_shared::TripTemplate;

const BUILTIN_TEMPLATES: &str = include_str!("../data/recommended_trips.json");

/// Fixed catalog of recommended trips, kept in declaration order
#[derive(Debug, Clone)]
pub struct RecommendedCatalog {
    templates: Vec<TripTemplate>,
}

impl RecommendedCatalog {
    /// The templates shipped with the application
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_TEMPLATES)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let templates: Vec<TripTemplate> = serde_json::from_str(json)?;
        Self::new(templates)
    }

    pub fn new(templates: Vec<TripTemplate>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for template in &templates {
            if !seen.insert(template.id.as_str()) {
                return Err(CatalogError::DuplicateId(template.id.clone()));
            }
            Self::validate(template)?;
        }
        Ok(Self { templates })
    }

    pub fn templates(&self) -> &[TripTemplate] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Option<&TripTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    fn validate(template: &TripTemplate) -> Result<(), CatalogError> {
        if template.name.trim().is_empty() || template.city.trim().is_empty() {
            return Err(CatalogError::InvalidTemplate {
                id: template.id.clone(),
                reason: "name and city are required".to_string(),
            });
        }

        for hotel in &template.hotels {
            if let Some(window) = hotel.window {
                if window.end_offset < window.start_offset {
                    return Err(CatalogError::InvalidTemplate {
                        id: template.id.clone(),
                        reason: format!(
                            "stay window for hotel {} ends before it starts",
                            hotel.hotel_id
                        ),
                    });
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl TemplateCatalog for RecommendedCatalog {
    async fn list_templates(&self) -> Result<Vec<TripTemplate>, RepoError> {
        Ok(self.templates.clone())
    }

    async fn get_template(&self, id: &str) -> Result<Option<TripTemplate>, RepoError> {
        Ok(self.get(id).cloned())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Template {id} is invalid: {reason}")]
    InvalidTemplate { id: String, reason: String },

    #[error("Duplicate template id: {0}")]
    DuplicateId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = RecommendedCatalog::builtin().unwrap();
        assert_eq!(catalog.templates().len(), 3);

        let paris = catalog.get("paris-getaway").unwrap();
        assert_eq!(paris.activities.len(), 6);
        assert_eq!(paris.hotels.len(), 2);
        assert_eq!(paris.last_offset(), 2);

        let cadiz = catalog.get("cadiz").unwrap();
        assert_eq!(cadiz.duration_days(), 4);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let json = r#"[
            {"id":"a","name":"A","city":"X","cover_image":null,"category":"popular","activities":[]},
            {"id":"a","name":"B","city":"Y","cover_image":null,"category":"beach","activities":[]}
        ]"#;
        assert!(matches!(
            RecommendedCatalog::from_json(json),
            Err(CatalogError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn test_rejects_inverted_stay_window() {
        let json = r#"[
            {"id":"a","name":"A","city":"X","cover_image":null,"category":"popular",
             "activities":[{"activity_id":1,"day_offset":0}],
             "hotels":[{"hotel_id":2,"window":{"start_offset":3,"end_offset":1}}]}
        ]"#;
        assert!(matches!(
            RecommendedCatalog::from_json(json),
            Err(CatalogError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_rejects_negative_offsets() {
        let json = r#"[
            {"id":"a","name":"A","city":"X","cover_image":null,"category":"popular",
             "activities":[{"activity_id":1,"day_offset":-1}]}
        ]"#;
        assert!(matches!(RecommendedCatalog::from_json(json), Err(CatalogError::Parse(_))));
    }

    #[tokio::test]
    async fn test_catalog_trait_lookup() {
        let catalog = RecommendedCatalog::builtin().unwrap();
        let found = catalog.get_template("ibiza-formentera").await.unwrap();
        assert!(found.is_some());
        assert!(catalog.get_template("atlantis").await.unwrap().is_none());
        assert_eq!(catalog.list_templates().await.unwrap().len(), 3);
    }
}
