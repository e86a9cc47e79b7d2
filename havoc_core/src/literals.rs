use rand::Rng;

/// Constants observed in the target, used to steer mutations toward values
/// that pass comparisons.
///
/// Integer literals are stored already encoded (little-endian, at the width
/// the comparison used). The table is read-only for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralTable {
    pub int_literals: Vec<Vec<u8>>,
    pub string_literals: Vec<Vec<u8>>,
}

impl LiteralTable {
    /// Creates a table from already-encoded integer literals and string literals.
    pub fn new(int_literals: Vec<Vec<u8>>, string_literals: Vec<Vec<u8>>) -> Self {
        Self {
            int_literals,
            string_literals,
        }
    }

    /// True when neither integer nor string literals are available.
    pub fn is_empty(&self) -> bool {
        self.int_literals.is_empty() && self.string_literals.is_empty()
    }

    /// Builder form of [`Self::push_int`] for unsigned constants.
    pub fn with_ints(mut self, values: impl IntoIterator<Item = u64>) -> Self {
        for value in values {
            self.push_int(value);
        }
        self
    }

    /// Builder form of [`Self::push_signed_int`] for signed constants.
    pub fn with_signed_ints(mut self, values: impl IntoIterator<Item = i64>) -> Self {
        for value in values {
            self.push_signed_int(value);
        }
        self
    }

    /// Adds an integer literal that is already encoded.
    pub fn push_int_bytes(&mut self, bytes: Vec<u8>) {
        self.int_literals.push(bytes);
    }

    /// Encodes `value` little-endian at the smallest of 1, 2, 4 or 8 bytes that holds it.
    pub fn push_int(&mut self, value: u64) {
        let bytes = value.to_le_bytes();
        let width = if value <= u64::from(u8::MAX) {
            1
        } else if value <= u64::from(u16::MAX) {
            2
        } else if value <= u64::from(u32::MAX) {
            4
        } else {
            8
        };
        self.int_literals.push(bytes[..width].to_vec());
    }

    /// Encodes `value` little-endian at the smallest of `i8`, `i16`, `i32` or `i64`
    /// that holds it, so `-1` becomes a single `0xFF` byte.
    pub fn push_signed_int(&mut self, value: i64) {
        let bytes = value.to_le_bytes();
        let width = if i8::try_from(value).is_ok() {
            1
        } else if i16::try_from(value).is_ok() {
            2
        } else if i32::try_from(value).is_ok() {
            4
        } else {
            8
        };
        self.int_literals.push(bytes[..width].to_vec());
    }

    /// Adds a string literal. Empty literals are ignored since inserting them changes nothing.
    pub fn push_string(&mut self, literal: impl Into<Vec<u8>>) {
        let literal = literal.into();
        if !literal.is_empty() {
            self.string_literals.push(literal);
        }
    }

    /// Draws one literal, or `None` when the table is empty.
    ///
    /// When both kinds are present a string literal is chosen with probability
    /// 1/2. An integer literal is emitted byte-reversed with probability 1/3 so
    /// both endiannesses get explored.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Vec<u8>> {
        let use_string = match (
            self.int_literals.is_empty(),
            self.string_literals.is_empty(),
        ) {
            (true, true) => return None,
            (true, false) => true,
            (false, true) => false,
            (false, false) => rng.random_bool(0.5),
        };

        if use_string {
            let idx = rng.random_range(0..self.string_literals.len());
            return Some(self.string_literals[idx].clone());
        }

        let idx = rng.random_range(0..self.int_literals.len());
        let mut lit = self.int_literals[idx].clone();
        if rng.random_range(0..3) == 0 {
            lit.reverse();
        }
        Some(lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;
    use rand_core::SeedableRng;

    #[test]
    fn empty_table_draws_nothing() {
        let table = LiteralTable::default();
        let mut rng = ChaCha8Rng::from_seed([0; 32]);
        assert!(table.is_empty());
        assert_eq!(table.draw(&mut rng), None);
    }

    #[test]
    fn push_int_uses_minimal_width() {
        let mut table = LiteralTable::default();
        table.push_int(0x7f);
        table.push_int(0x1234);
        table.push_int(0x10_0000);
        table.push_int(0x1_0000_0000);
        assert_eq!(table.int_literals[0], vec![0x7f]);
        assert_eq!(table.int_literals[1], vec![0x34, 0x12]);
        assert_eq!(table.int_literals[2], vec![0x00, 0x00, 0x10, 0x00]);
        assert_eq!(table.int_literals[3].len(), 8);
    }

    #[test]
    fn push_signed_int_uses_minimal_signed_width() {
        let mut table = LiteralTable::default();
        table.push_signed_int(-1);
        table.push_signed_int(-129);
        table.push_signed_int(i64::from(i32::MIN));
        table.push_signed_int(i64::from(i32::MIN) - 1);
        table.push_signed_int(127);
        assert_eq!(table.int_literals[0], vec![0xFF]);
        assert_eq!(table.int_literals[1], vec![0x7F, 0xFF]);
        assert_eq!(table.int_literals[2], vec![0x00, 0x00, 0x00, 0x80]);
        assert_eq!(table.int_literals[3].len(), 8);
        assert_eq!(table.int_literals[4], vec![0x7F]);
    }

    #[test]
    fn builders_encode_each_value() {
        let table = LiteralTable::default()
            .with_ints([0xFF, 0x1_0000])
            .with_signed_ints([-1, 300]);
        assert_eq!(
            table.int_literals,
            vec![
                vec![0xFF],
                vec![0x00, 0x00, 0x01, 0x00],
                vec![0xFF],
                vec![0x2C, 0x01],
            ]
        );
        assert!(table.string_literals.is_empty());
    }

    #[test]
    fn empty_string_literals_are_ignored() {
        let mut table = LiteralTable::default();
        table.push_string("");
        assert!(table.is_empty());
        table.push_string("x");
        assert_eq!(table.string_literals, vec![b"x".to_vec()]);
    }

    #[test]
    fn string_only_table_always_draws_strings() {
        let mut table = LiteralTable::default();
        table.push_string("GET");
        let mut rng = ChaCha8Rng::from_seed([1; 32]);
        for _ in 0..100 {
            assert_eq!(table.draw(&mut rng), Some(b"GET".to_vec()));
        }
    }

    #[test]
    fn int_literals_are_drawn_in_both_byte_orders() {
        let mut table = LiteralTable::default();
        table.push_int_bytes(vec![0x01, 0x02, 0x03, 0x04]);
        let mut rng = ChaCha8Rng::from_seed([2; 32]);

        let mut forward = 0;
        let mut reversed = 0;
        for _ in 0..300 {
            match table.draw(&mut rng).unwrap().as_slice() {
                [0x01, 0x02, 0x03, 0x04] => forward += 1,
                [0x04, 0x03, 0x02, 0x01] => reversed += 1,
                other => panic!("Unexpected literal drawn: {:?}", other),
            }
        }
        assert!(forward > 0 && reversed > 0);
        assert!(forward > reversed, "Reversal should happen about 1/3 of the time");
    }

    #[test]
    fn mixed_table_draws_both_kinds() {
        let mut table = LiteralTable::default();
        table.push_int_bytes(vec![0xAA]);
        table.push_string("needle");
        let mut rng = ChaCha8Rng::from_seed([4; 32]);

        let drawn: Vec<Vec<u8>> = (0..100).filter_map(|_| table.draw(&mut rng)).collect();
        assert!(drawn.iter().any(|l| l == b"needle"));
        assert!(drawn.iter().any(|l| l.as_slice() == [0xAAu8]));
    }
}
