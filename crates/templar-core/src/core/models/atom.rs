use super::structure::ResidueId;
use nalgebra::Point3;

/// A single atom record from a coordinate file.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub serial: usize,              // Serial number from the source file
    pub name: String,               // Atom name (e.g., "CA", "OG1")
    pub element: Option<String>,    // Element symbol when the file provides one
    pub residue_id: ResidueId,      // ID of the parent residue
    pub position: Point3<f64>,      // Cartesian coordinates in Angstroms
}

impl Atom {
    pub fn new(serial: usize, name: &str, residue_id: ResidueId, position: Point3<f64>) -> Self {
        Self {
            serial,
            name: name.to_string(),
            element: None,
            residue_id,
            position,
        }
    }

    pub fn with_element(mut self, element: &str) -> Self {
        let element = element.trim();
        self.element = (!element.is_empty()).then(|| element.to_string());
        self
    }

    pub fn distance_to(&self, other: &Atom) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }
}
