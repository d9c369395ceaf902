//! Driving Profiles
//!
//! A profile is a named parameter set governing the simulated engine: rev ceiling,
//! torque factor and fuel type. The catalog holds every profile for the lifetime of
//! the session plus a pointer to the active one.
//!
//! Profiles are keyed by a stable [`ProfileId`]. The name is a unique, mutable display
//! attribute, so anything holding a name must re-resolve it after a rename.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by profile management operations.
///
/// A failed operation never modifies the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// Another profile already uses the name
    #[error("A profile named '{0}' already exists")]
    DuplicateName(String),

    /// No profile has the name
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// The profile is active and cannot be deleted
    #[error("Cannot delete the active profile '{0}'")]
    ActiveProfile(String),

    /// A field is out of range
    #[error("Invalid profile definition: {0}")]
    InvalidDefinition(String),
}

/// Fuel type of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    /// Petrol engine
    Gasoline,
    /// Diesel engine
    Diesel,
    /// Battery electric
    Electric,
    /// Combustion plus electric
    Hybrid,
}

impl FuelType {
    /// Parse a fuel type name, case-insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "gasoline" | "petrol" => Some(FuelType::Gasoline),
            "diesel" => Some(FuelType::Diesel),
            "electric" | "ev" => Some(FuelType::Electric),
            "hybrid" => Some(FuelType::Hybrid),
            _ => None,
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FuelType::Gasoline => "Gasoline",
            FuelType::Diesel => "Diesel",
            FuelType::Electric => "Electric",
            FuelType::Hybrid => "Hybrid",
        };
        f.write_str(name)
    }
}

/// Highest rev ceiling a profile may declare; RPM values are carried as `i32`
pub const MAX_PROFILE_RPM: u32 = i32::MAX as u32;

/// Names must be non-empty single lines, they end up as a log column
fn validate_name(name: &str) -> Result<(), ProfileError> {
    if name.trim().is_empty() {
        return Err(ProfileError::InvalidDefinition(
            "name must not be empty".to_string(),
        ));
    }
    if name.contains(['\n', '\r']) {
        return Err(ProfileError::InvalidDefinition(format!(
            "name must be a single line: {:?}",
            name
        )));
    }
    Ok(())
}

/// Stable identifier of a profile within a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProfileId(u32);

/// A driving profile definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefinition {
    /// Display name, unique within the catalog
    pub name: String,
    /// Engine rev ceiling in RPM
    pub max_rpm: u32,
    /// Torque multiplier reported alongside the profile
    pub torque_factor: f64,
    /// Fuel type, if known
    pub fuel_type: Option<FuelType>,
}

impl ProfileDefinition {
    /// Create a new profile definition
    pub fn new(
        name: impl Into<String>,
        max_rpm: u32,
        torque_factor: f64,
        fuel_type: Option<FuelType>,
    ) -> Self {
        Self {
            name: name.into(),
            max_rpm,
            torque_factor,
            fuel_type,
        }
    }

    /// Check the definition invariants
    pub fn validate(&self) -> Result<(), ProfileError> {
        validate_name(&self.name)?;
        if self.max_rpm == 0 {
            return Err(ProfileError::InvalidDefinition(format!(
                "max_rpm must be positive for '{}'",
                self.name
            )));
        }
        if self.max_rpm > MAX_PROFILE_RPM {
            return Err(ProfileError::InvalidDefinition(format!(
                "max_rpm must not exceed {} for '{}', got {}",
                MAX_PROFILE_RPM, self.name, self.max_rpm
            )));
        }
        if !self.torque_factor.is_finite() || self.torque_factor <= 0.0 {
            return Err(ProfileError::InvalidDefinition(format!(
                "torque_factor must be positive for '{}', got {}",
                self.name, self.torque_factor
            )));
        }
        Ok(())
    }

    /// The built-in profiles every session starts with
    pub fn builtin() -> Vec<ProfileDefinition> {
        vec![
            ProfileDefinition::new("Economy", 6000, 0.8, Some(FuelType::Gasoline)),
            ProfileDefinition::new("Sport", 8000, 1.2, Some(FuelType::Gasoline)),
            ProfileDefinition::new("Diesel", 4500, 1.5, Some(FuelType::Diesel)),
        ]
    }
}

/// Collection of driving profiles with a single active profile
#[derive(Debug, Clone)]
pub struct ProfileCatalog {
    /// Profiles in creation order
    profiles: BTreeMap<ProfileId, ProfileDefinition>,
    /// Currently active profile (always present in `profiles`)
    active: ProfileId,
    /// Next id to hand out
    next_id: u32,
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::with_builtin()
    }
}

impl ProfileCatalog {
    /// Create a catalog holding the built-in profiles, with the first one active
    pub fn with_builtin() -> Self {
        let mut builtin = ProfileDefinition::builtin().into_iter();
        let first = builtin.next().unwrap_or_else(|| {
            ProfileDefinition::new("Economy", 6000, 0.8, Some(FuelType::Gasoline))
        });
        let mut catalog = Self::new(first);
        for definition in builtin {
            let name = definition.name.clone();
            if let Err(e) = catalog.insert(definition) {
                tracing::warn!("Skipping built-in profile '{}': {}", name, e);
            }
        }
        catalog
    }

    /// Create a catalog holding a single profile, which becomes active.
    ///
    /// The initial definition is trusted; use [`ProfileCatalog::create`] for user input.
    pub fn new(initial: ProfileDefinition) -> Self {
        let id = ProfileId(0);
        let mut profiles = BTreeMap::new();
        profiles.insert(id, initial);
        Self {
            profiles,
            active: id,
            next_id: 1,
        }
    }

    /// Number of profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if the catalog is empty (never true, the active profile always exists)
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Iterate over profiles in creation order
    pub fn iter(&self) -> impl Iterator<Item = (ProfileId, &ProfileDefinition)> {
        self.profiles.iter().map(|(id, def)| (*id, def))
    }

    /// Profile names in creation order
    pub fn names(&self) -> Vec<&str> {
        self.profiles.values().map(|p| p.name.as_str()).collect()
    }

    /// Resolve a name to its id
    pub fn id_of(&self, name: &str) -> Option<ProfileId> {
        self.profiles
            .iter()
            .find(|(_, def)| def.name == name)
            .map(|(id, _)| *id)
    }

    /// Get a profile by name
    pub fn get(&self, name: &str) -> Option<&ProfileDefinition> {
        self.id_of(name).and_then(|id| self.profiles.get(&id))
    }

    /// Get a profile by id
    pub fn get_by_id(&self, id: ProfileId) -> Option<&ProfileDefinition> {
        self.profiles.get(&id)
    }

    /// Id of the active profile
    pub fn active_id(&self) -> ProfileId {
        self.active
    }

    /// The active profile
    pub fn active(&self) -> &ProfileDefinition {
        // The active id is only ever set to an existing key and the active
        // profile cannot be deleted.
        &self.profiles[&self.active]
    }

    /// Name of the active profile
    pub fn active_name(&self) -> &str {
        &self.active().name
    }

    /// Add a new profile
    pub fn create(
        &mut self,
        name: impl Into<String>,
        max_rpm: u32,
        torque_factor: f64,
        fuel_type: Option<FuelType>,
    ) -> Result<ProfileId, ProfileError> {
        let definition = ProfileDefinition::new(name, max_rpm, torque_factor, fuel_type);
        let id = self.insert(definition)?;
        tracing::info!("Created profile '{}'", self.profiles[&id].name);
        Ok(id)
    }

    fn insert(&mut self, definition: ProfileDefinition) -> Result<ProfileId, ProfileError> {
        definition.validate()?;
        if self.id_of(&definition.name).is_some() {
            return Err(ProfileError::DuplicateName(definition.name));
        }
        let id = ProfileId(self.next_id);
        self.next_id += 1;
        self.profiles.insert(id, definition);
        Ok(id)
    }

    /// Rename a profile, keeping every other field
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), ProfileError> {
        let id = self
            .id_of(old)
            .ok_or_else(|| ProfileError::NotFound(old.to_string()))?;
        if old == new {
            return Ok(());
        }
        validate_name(new)?;
        if self.id_of(new).is_some() {
            return Err(ProfileError::DuplicateName(new.to_string()));
        }
        if let Some(definition) = self.profiles.get_mut(&id) {
            definition.name = new.to_string();
        }
        tracing::info!("Renamed profile '{}' to '{}'", old, new);
        Ok(())
    }

    /// Remove a profile that is not active
    pub fn delete(&mut self, name: &str) -> Result<ProfileDefinition, ProfileError> {
        let id = self
            .id_of(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))?;
        if id == self.active {
            return Err(ProfileError::ActiveProfile(name.to_string()));
        }
        let removed = self
            .profiles
            .remove(&id)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))?;
        tracing::info!("Deleted profile '{}'", name);
        Ok(removed)
    }

    /// Make a profile active
    pub fn select(&mut self, name: &str) -> Result<&ProfileDefinition, ProfileError> {
        let id = self
            .id_of(name)
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))?;
        self.active = id;
        tracing::debug!("Active profile is now '{}'", name);
        Ok(self.active())
    }
}
