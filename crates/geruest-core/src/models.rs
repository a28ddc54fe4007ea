pub mod building;
pub mod drawing;
pub mod facade;
pub mod heights;
pub mod material;
pub mod scaffold;
pub mod takeoff;

pub use building::{
    AddressLookup, BuildingHeights, BuildingRecord, Coordinates, HeightSource, ManualHeights,
    RoofShape, ScaffoldingGeometry,
};
pub use drawing::{DrawingKind, DrawingRequest, DrawingSubject};
pub use facade::{CompassDirection, FacadeSide};
pub use heights::{HeightDebug, HeightFetchRequest, HeightFetchResponse, HeightImportStatus};
pub use material::{CatalogCategory, CatalogEstimate, CatalogItem, MaterialEstimate};
pub use scaffold::{ScaffoldSystem, ScaffoldType, ScaffoldingConfig, WidthClass, WorkType};
pub use takeoff::{FacadeTakeoff, TakeoffRequest, TakeoffResult, TakeoffSource};
