//! Test fixtures: sample jobs and minimal image payloads

/// Sample job registration values
#[derive(Debug, Clone)]
pub struct JobFixture {
    pub customer_name: &'static str,
    pub technician_name: &'static str,
    pub job_type: &'static str,
    pub scheduled_date: Option<&'static str>,
}

pub const JOB_FIXTURES: &[JobFixture] = &[
    JobFixture {
        customer_name: "Maple Street Dental",
        technician_name: "Dana Ortiz",
        job_type: "Rooftop unit inspection",
        scheduled_date: Some("2024-11-04"),
    },
    JobFixture {
        customer_name: "Harbor View Apartments",
        technician_name: "Sam Lee",
        job_type: "Boiler repair",
        scheduled_date: Some("2024-11-05"),
    },
    JobFixture {
        customer_name: "Greenleaf Bakery",
        technician_name: "Dana Ortiz",
        job_type: "Walk-in cooler service",
        scheduled_date: None,
    },
];

/// PNG signature followed by an IHDR chunk header; enough for format sniffing.
pub fn png_bytes() -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&[0, 0, 0, 13, b'I', b'H', b'D', b'R']);
    data.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 1, 8, 2, 0, 0, 0]);
    data
}

/// JPEG SOI + APP0 marker.
pub fn jpeg_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00]
}

/// A PNG payload of exactly `len` bytes.
pub fn png_of_size(len: usize) -> Vec<u8> {
    let mut data = png_bytes();
    data.resize(len, 0);
    data
}
