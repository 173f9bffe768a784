//! # Repository Module
//!
//! ## Repository Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  db.raw_materials()   → RawMaterialRepository                          │
//! │                          insert / get_by_id / list / update / delete   │
//! │                                                                         │
//! │  db.products()        → ProductRepository                              │
//! │                          product CRUD, BOM lines, load_catalog         │
//! │                                                                         │
//! │  db.production()      → ProductionRepository                           │
//! │                          suggestions / settle / confirm_suggestions    │
//! │                                                                         │
//! │  Only ProductionRepository mutates stock as a side effect of           │
//! │  production; the other two are plain collaborators.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod product;
pub mod production;
pub mod raw_material;

/// `LIKE` pattern for an optional name filter. Blank filters match everything.
pub(crate) fn name_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.to_lowercase()))
}
