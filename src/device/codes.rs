//! Shared error-code lookup tables.

/// Description returned for codes missing from a table.
pub const UNKNOWN_ERROR_CODE: &str = "Unknown error code";

/// Constant `(code, description)` table for a device family.
///
/// Drivers of the same family report failures through one table instead
/// of each carrying its own copy.
#[derive(Clone, Copy, Debug)]
pub struct ErrorCodeTable {
    name: &'static str,
    entries: &'static [(u32, &'static str)],
}

impl ErrorCodeTable {
    pub const fn new(name: &'static str, entries: &'static [(u32, &'static str)]) -> Self {
        Self { name, entries }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Description of `code`, or [`UNKNOWN_ERROR_CODE`].
    pub fn describe(&self, code: u32) -> &'static str {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, description)| *description)
            .unwrap_or(UNKNOWN_ERROR_CODE)
    }

    pub fn contains(&self, code: u32) -> bool {
        self.entries.iter().any(|(c, _)| *c == code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Completion codes of the optical tracker family.
pub const OPTICAL_TRACKER_ERRORS: ErrorCodeTable = ErrorCodeTable::new(
    "optical-tracker",
    &[
        (0, "OK"),
        (1, "Invalid object handle"),
        (2, "Reentrant access - library is not thread-safe"),
        (3, "Internal tracker software error"),
        (4, "Null pointer parameter"),
        (5, "Out of memory"),
        (6, "Parameter out of range"),
        (7, "String parameter too long"),
        (8, "Insufficient space allocated by the client to the output buffer"),
        (9, "Camera not initialized"),
        (10, "Camera already initialized - cannot be initialized twice"),
        (11, "Camera initialization failed"),
        (12, "Incompatible with a software module it calls"),
        (13, "Calibration file error: unrecognized camera model"),
        (14, "Path not set"),
        (15, "Cannot access the directory specified"),
        (16, "Write to file failed"),
        (17, "Invalid Index parameter"),
        (18, "Invalid SideI parameter"),
        (19, "Invalid Divisor parameter"),
        (20, "Attempting to access an item of an empty IntCollection"),
        (21, "Insufficient samples"),
        (22, "Insufficient samples that fit within the acceptance tolerance"),
        (23, "Odd number of vector samples"),
        (24, "Less than 2 vectors"),
        (25, "More than maximum vectors per facet"),
        (26, "Error exceeds tolerance"),
        (27, "Insufficient angle between vectors"),
        (28, "First vector is shorter than the second"),
        (29, "Vector lengths are too similar"),
        (30, "Template vector has 0 length"),
        (31, "The template has not been created or loaded"),
        (32, "Template file is corrupt"),
        (33, "Maximum number of marker templates allowed exceeded"),
        (34, "Geometries of different facets are too similar"),
        (35, "Noncompliant facet definition"),
        (36, "The SampledVectorPairsCollection contains non-Vector handles"),
        (37, "Empty pixels buffer"),
        (38, "Dimensions do not match"),
        (39, "File open failed"),
        (40, "File read failed"),
        (41, "File write failed"),
        (42, "Cannot open calibration file"),
        (43, "Not a calibration file"),
        (44, "Calibration file contents corrupt"),
        (45, "Calibration file was not generated from this camera"),
        (46, "Calibration file not loaded"),
        (47, "Incorrect file version"),
        (48, "Input image location is out of bounds of the measurement volume"),
        (49, "Input image locations do not triangulate to a valid 3-D point"),
        (50, "Transform between coordinate spaces is unknown"),
        (51, "The given camera object was not found in the cameras array"),
        (52, "Feature Data unavailable for the current frame"),
        (53, "Feature Data is corrupt or incompatible with the current version"),
        (54, "XYZ position is outside of calibrated field of view"),
        (55, "Grab frame error"),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optical_table_covers_all_codes() {
        assert_eq!(OPTICAL_TRACKER_ERRORS.len(), 56);
        assert!((0..=55).all(|code| OPTICAL_TRACKER_ERRORS.contains(code)));
    }

    #[test]
    fn known_codes_resolve() {
        assert_eq!(OPTICAL_TRACKER_ERRORS.describe(0), "OK");
        assert_eq!(OPTICAL_TRACKER_ERRORS.describe(55), "Grab frame error");
    }

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(OPTICAL_TRACKER_ERRORS.describe(56), UNKNOWN_ERROR_CODE);
        assert_eq!(OPTICAL_TRACKER_ERRORS.describe(u32::MAX), UNKNOWN_ERROR_CODE);
    }

    #[test]
    fn custom_tables_are_independent() {
        const SERIAL: ErrorCodeTable = ErrorCodeTable::new("serial", &[(1, "Timeout")]);
        assert_eq!(SERIAL.describe(1), "Timeout");
        assert_eq!(SERIAL.describe(0), UNKNOWN_ERROR_CODE);
        assert_eq!(SERIAL.name(), "serial");
    }
}
