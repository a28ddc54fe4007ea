//! Planning session: the four-step wizard state for one address
//!
//! Grunddaten → Gerüstbau → Ausmass → Material. A new address search resets
//! everything except the configured system defaults.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

use crate::error::{GeruestError, Result};
use crate::models::{
    AddressLookup, FacadeSide, ManualHeights, MaterialEstimate, ScaffoldSystem, ScaffoldType,
    ScaffoldingConfig, ScaffoldingGeometry, TakeoffRequest, TakeoffResult, WidthClass, WorkType,
};
use crate::selection::{FacadeSelection, SelectionState};
use crate::takeoff;

/// Wizard steps in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Grunddaten,
    Geruestbau,
    Ausmass,
    Material,
}

impl WizardStep {
    pub const ALL: [WizardStep; 4] =
        [WizardStep::Grunddaten, WizardStep::Geruestbau, WizardStep::Ausmass, WizardStep::Material];

    /// 1-based position for display
    pub fn number(&self) -> usize {
        match self {
            WizardStep::Grunddaten => 1,
            WizardStep::Geruestbau => 2,
            WizardStep::Ausmass => 3,
            WizardStep::Material => 4,
        }
    }

    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Grunddaten => Some(WizardStep::Geruestbau),
            WizardStep::Geruestbau => Some(WizardStep::Ausmass),
            WizardStep::Ausmass => Some(WizardStep::Material),
            WizardStep::Material => None,
        }
    }

    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::Grunddaten => None,
            WizardStep::Geruestbau => Some(WizardStep::Grunddaten),
            WizardStep::Ausmass => Some(WizardStep::Geruestbau),
            WizardStep::Material => Some(WizardStep::Ausmass),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WizardStep::Grunddaten => "Grunddaten",
            WizardStep::Geruestbau => "Gerüstbau",
            WizardStep::Ausmass => "Ausmass",
            WizardStep::Material => "Material",
        };
        f.write_str(label)
    }
}

/// State of one planning session
#[derive(Debug, Clone)]
pub struct PlanningSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    step: WizardStep,
    defaults: ScaffoldingConfig,
    lookup: Option<AddressLookup>,
    geometry: Option<ScaffoldingGeometry>,
    selection: FacadeSelection,
    config: ScaffoldingConfig,
    takeoff: Option<TakeoffResult>,
}

impl Default for PlanningSession {
    fn default() -> Self {
        Self::new(ScaffoldSystem::default(), WidthClass::default())
    }
}

impl PlanningSession {
    /// Create a session; `system` and `width_class` survive address changes
    pub fn new(system: ScaffoldSystem, width_class: WidthClass) -> Self {
        let defaults = ScaffoldingConfig { system, width_class, ..Default::default() };
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            step: WizardStep::Grunddaten,
            config: defaults.clone(),
            defaults,
            lookup: None,
            geometry: None,
            selection: FacadeSelection::new(),
            takeoff: None,
        }
    }

    /// Begin a new address session, discarding all address-bound state
    pub fn start(&mut self, lookup: AddressLookup) {
        self.id = Uuid::new_v4();
        self.started_at = Utc::now();
        self.step = WizardStep::Grunddaten;
        self.geometry = None;
        self.selection.clear();
        self.config = self.defaults.clone();
        self.takeoff = None;

        tracing::info!(session = %self.id, address = %lookup.label, "Started planning session");
        self.lookup = Some(lookup);
    }

    /// Replace the facade collection; the selection resets to its default
    pub fn load_geometry(&mut self, geometry: ScaffoldingGeometry) {
        self.selection.load(geometry.sides.clone());
        self.config.heights = geometry.heights;
        self.config.roof_shape = geometry.roof_shape;
        self.takeoff = None;

        tracing::info!(
            session = %self.id,
            sides = geometry.sides.len(),
            selected = self.selection.len(),
            "Loaded scaffolding geometry"
        );
        self.geometry = Some(geometry);
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn lookup(&self) -> Option<&AddressLookup> {
        self.lookup.as_ref()
    }

    pub fn geometry(&self) -> Option<&ScaffoldingGeometry> {
        self.geometry.as_ref()
    }

    pub fn config(&self) -> &ScaffoldingConfig {
        &self.config
    }

    pub fn selection(&self) -> &FacadeSelection {
        &self.selection
    }

    pub fn selection_state(&self) -> SelectionState {
        self.selection.state()
    }

    /// Address used for backend requests
    pub fn address(&self) -> Option<&str> {
        self.lookup
            .as_ref()
            .map(|l| l.label.as_str())
            .or_else(|| self.geometry.as_ref().map(|g| g.address.as_str()))
    }

    pub fn toggle_facade(&mut self, index: usize) -> Result<bool> {
        let selected = self.selection.toggle(index)?;
        self.takeoff = None;
        Ok(selected)
    }

    pub fn select_facades(&mut self, indices: impl IntoIterator<Item = usize>) -> Result<()> {
        self.selection.set(indices)?;
        self.takeoff = None;
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.selection.select_all();
        self.takeoff = None;
    }

    pub fn deselect_all(&mut self) {
        self.selection.deselect_all();
        self.takeoff = None;
    }

    pub fn set_work_type(&mut self, work_type: WorkType) {
        self.config.work_type = work_type;
        self.takeoff = None;
    }

    pub fn set_scaffold_type(&mut self, scaffold_type: ScaffoldType) {
        self.config.scaffold_type = scaffold_type;
    }

    pub fn set_width_class(&mut self, width_class: WidthClass) {
        self.config.width_class = width_class;
        self.takeoff = None;
    }

    pub fn set_system(&mut self, system: ScaffoldSystem) {
        self.config.system = system;
        self.takeoff = None;
    }

    /// Apply eave/ridge overrides; empty overrides remove them
    pub fn set_manual_heights(&mut self, manual: ManualHeights) {
        self.config.manual_heights = if manual.is_empty() { None } else { Some(manual) };
        self.takeoff = None;
    }

    pub fn scaffold_height(&self) -> f64 {
        self.config.scaffold_height()
    }

    pub fn selected_sides(&self) -> Vec<&FacadeSide> {
        self.selection.selected_sides().collect()
    }

    pub fn total_length(&self) -> f64 {
        self.config.total_length(self.selection.selected_sides())
    }

    pub fn total_area(&self) -> f64 {
        self.config.total_area(self.selection.selected_sides())
    }

    /// Check whether the current step allows moving forward
    pub fn can_advance(&self) -> Result<()> {
        match self.step {
            WizardStep::Grunddaten if self.geometry.is_none() => Err(GeruestError::GeometryMissing),
            WizardStep::Geruestbau | WizardStep::Ausmass if self.selection.is_empty() => {
                Err(GeruestError::NoFacadesSelected)
            }
            _ => Ok(()),
        }
    }

    /// Move to the next step; stays on the last step
    pub fn advance(&mut self) -> Result<WizardStep> {
        self.can_advance()?;
        if let Some(next) = self.step.next() {
            tracing::debug!(session = %self.id, from = %self.step, to = %next, "Advancing wizard");
            self.step = next;
        }
        Ok(self.step)
    }

    /// Move to the previous step; leaving the results discards the take-off
    pub fn back(&mut self) -> WizardStep {
        if let Some(previous) = self.step.previous() {
            if previous < WizardStep::Ausmass {
                self.takeoff = None;
            }
            self.step = previous;
        }
        self.step
    }

    /// Local NPK 114 take-off for the current selection
    pub fn compute_takeoff(&self) -> Result<TakeoffResult> {
        if self.selection.is_empty() {
            return Err(GeruestError::NoFacadesSelected);
        }
        Ok(takeoff::compute_takeoff(self.selection.selected_sides(), self.scaffold_height()))
    }

    /// Parameters for the backend take-off endpoint
    pub fn takeoff_request(&self) -> Result<TakeoffRequest> {
        let address = self.address().ok_or(GeruestError::GeometryMissing)?;
        if self.selection.is_empty() {
            return Err(GeruestError::NoFacadesSelected);
        }

        Ok(TakeoffRequest {
            address: address.to_string(),
            system: self.config.system,
            roof_shape: self.config.roof_shape,
            width_class: self.config.width_class,
            work_type: self.config.work_type,
            height: self.scaffold_height(),
            facades: self.selection.indices(),
        })
    }

    pub fn set_takeoff(&mut self, result: TakeoffResult) {
        self.takeoff = Some(result);
    }

    pub fn takeoff(&self) -> Option<&TakeoffResult> {
        self.takeoff.as_ref()
    }

    /// Coarse material estimate for the current take-off
    pub fn material_estimate(&self) -> Option<MaterialEstimate> {
        self.takeoff.as_ref().map(|t| takeoff::estimate_material(t.total_area))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BuildingHeights, CompassDirection, Coordinates, HeightSource, RoofShape, TakeoffSource,
    };

    fn lookup(label: &str) -> AddressLookup {
        AddressLookup {
            query: label.to_string(),
            label: label.to_string(),
            coordinates: Coordinates { lat: 47.37, lon: 8.54, lv95_e: 2_683_000.0, lv95_n: 1_247_000.0 },
            buildings: Vec::new(),
        }
    }

    fn geometry(address: &str) -> ScaffoldingGeometry {
        let side = |index: usize, length_m: f64| FacadeSide {
            index,
            start: [0.0, 0.0],
            end: [length_m, 0.0],
            length_m,
            direction: CompassDirection::S,
            angle_deg: 0.0,
        };
        ScaffoldingGeometry {
            address: address.to_string(),
            egid: Some(190_365),
            polygon: Vec::new(),
            sides: vec![side(0, 10.0), side(1, 6.0), side(2, 0.4)],
            heights: BuildingHeights {
                eave_height_m: Some(8.0),
                ridge_height_m: Some(12.0),
                estimated_height_m: None,
                source: HeightSource::Measured,
            },
            roof_shape: RoofShape::Hip,
            floors: Some(3),
        }
    }

    fn loaded_session() -> PlanningSession {
        let mut session = PlanningSession::default();
        session.start(lookup("Seestrasse 10, 8800 Thalwil"));
        session.load_geometry(geometry("Seestrasse 10, 8800 Thalwil"));
        session
    }

    #[test]
    fn test_cannot_leave_grunddaten_without_geometry() {
        let mut session = PlanningSession::default();
        session.start(lookup("Seestrasse 10, 8800 Thalwil"));
        assert!(matches!(session.advance(), Err(GeruestError::GeometryMissing)));
        assert_eq!(session.step(), WizardStep::Grunddaten);
    }

    #[test]
    fn test_empty_selection_blocks_progression() {
        let mut session = loaded_session();
        session.advance().unwrap();
        session.deselect_all();

        assert!(matches!(session.advance(), Err(GeruestError::NoFacadesSelected)));
        assert!(matches!(session.compute_takeoff(), Err(GeruestError::NoFacadesSelected)));
        assert!(matches!(session.takeoff_request(), Err(GeruestError::NoFacadesSelected)));
        assert_eq!(session.step(), WizardStep::Geruestbau);
    }

    #[test]
    fn test_full_walk_through() {
        let mut session = loaded_session();
        assert_eq!(session.advance().unwrap(), WizardStep::Geruestbau);
        assert_eq!(session.advance().unwrap(), WizardStep::Ausmass);

        let result = session.compute_takeoff().unwrap();
        // facade work at eave 8 m: (12 + 8) * 9 + 2 * 9
        assert!((result.total_area - 198.0).abs() < 1e-9);
        assert_eq!(result.source, TakeoffSource::Local);
        session.set_takeoff(result);

        assert_eq!(session.advance().unwrap(), WizardStep::Material);
        let material = session.material_estimate().unwrap();
        assert_eq!(material.pieces, 495);

        assert_eq!(session.advance().unwrap(), WizardStep::Material);
    }

    #[test]
    fn test_back_from_results_discards_takeoff() {
        let mut session = loaded_session();
        session.advance().unwrap();
        session.advance().unwrap();
        let result = session.compute_takeoff().unwrap();
        session.set_takeoff(result);
        session.advance().unwrap();

        assert_eq!(session.back(), WizardStep::Ausmass);
        assert!(session.takeoff().is_some());
        assert_eq!(session.back(), WizardStep::Geruestbau);
        assert!(session.takeoff().is_none());
    }

    #[test]
    fn test_new_address_resets_selection_and_config() {
        let mut session = loaded_session();
        session.toggle_facade(0).unwrap();
        session.set_work_type(WorkType::RoofWork);
        session.set_manual_heights(ManualHeights::new(Some(9.0), None));

        session.start(lookup("Dorfstrasse 1, 8805 Richterswil"));
        assert_eq!(session.selection_state(), SelectionState::Empty);
        assert_eq!(session.config().work_type, WorkType::FacadeWork);
        assert!(session.config().manual_heights.is_none());
        assert!(session.geometry().is_none());
        assert_eq!(session.step(), WizardStep::Grunddaten);
    }

    #[test]
    fn test_defaults_survive_new_address() {
        let mut session = PlanningSession::new(ScaffoldSystem::Allround, WidthClass::W12);
        session.start(lookup("Seestrasse 10, 8800 Thalwil"));
        assert_eq!(session.config().system, ScaffoldSystem::Allround);
        assert_eq!(session.config().width_class, WidthClass::W12);
    }

    #[test]
    fn test_takeoff_request_uses_work_type_height() {
        let mut session = loaded_session();
        session.set_work_type(WorkType::RoofWork);
        let request = session.takeoff_request().unwrap();

        assert_eq!(request.address, "Seestrasse 10, 8800 Thalwil");
        assert!((request.height - 13.0).abs() < 1e-9);
        assert_eq!(request.roof_shape, RoofShape::Hip);
        assert_eq!(request.facades, vec![0, 1]);
    }

    #[test]
    fn test_selection_change_invalidates_takeoff() {
        let mut session = loaded_session();
        let result = session.compute_takeoff().unwrap();
        session.set_takeoff(result);
        session.toggle_facade(1).unwrap();
        assert!(session.takeoff().is_none());
        assert!((session.total_length() - 10.0).abs() < 1e-9);
        assert!((session.total_area() - 80.0).abs() < 1e-9);
    }
}
