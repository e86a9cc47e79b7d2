/// Boundary values for 8-bit fields.
const BASE_8: [i8; 9] = [-128, -1, 0, 1, 16, 32, 64, 100, 127];
/// Boundary values for 16-bit fields, before the 8-bit values are widened in.
const BASE_16: [i16; 10] = [-32768, -129, 128, 255, 256, 512, 1000, 1024, 4096, 32767];
/// Boundary values for 32-bit fields, before the 16-bit table is widened in.
const BASE_32: [i32; 8] = [
    -2147483648,
    -100663046,
    -32769,
    32768,
    65535,
    65536,
    100663045,
    2147483647,
];

/// The "interesting" integer tables used by the overwrite mutations.
///
/// Each wider table ends with every entry of the narrower one, sign-extended.
/// Entries are appended without deduplication, so small-magnitude values are
/// drawn more often from the wider tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterestingValues {
    pub i8: Vec<i8>,
    pub i16: Vec<i16>,
    pub i32: Vec<i32>,
}

impl InterestingValues {
    /// Builds the three tables. Call once per worker (or once per process and clone).
    pub fn build() -> Self {
        let i8 = BASE_8.to_vec();

        let mut i16 = BASE_16.to_vec();
        i16.extend(i8.iter().map(|&v| i16::from(v)));

        let mut i32 = BASE_32.to_vec();
        i32.extend(i16.iter().map(|&v| i32::from(v)));

        Self { i8, i16, i32 }
    }
}

impl Default for InterestingValues {
    fn default() -> Self {
        Self::build()
    }
}
