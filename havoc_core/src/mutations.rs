//! The byte-level mutation operators.
//!
//! Every operator follows the same contract: it either transforms the buffer
//! and reports [`OperatorOutcome::Mutated`], or finds itself infeasible for the
//! current buffer/corpus state and reports [`OperatorOutcome::Infeasible`]
//! without touching the buffer. Positions and lengths are always derived from
//! the current buffer length, so no operator can index out of bounds.

use crate::codec::{
    read_u16_le, read_u32_le, read_u64_le, swap16, swap32, swap64, write_u16_le, write_u32_le,
    write_u64_le,
};
use crate::corpus::CorpusEntry;
use crate::interesting::InterestingValues;
use crate::literals::LiteralTable;
use rand::Rng;

/// Largest delta used by the arithmetic mutations.
const ARITH_MAX: u8 = 35;
/// Maximum number of random bytes inserted by [`MutationOperator::InsertRandomBytes`].
const RANDOM_INSERT_MAX: usize = 10;

/// The result of attempting a single operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorOutcome {
    Mutated,
    /// The operator's guard failed; the buffer is unchanged.
    Infeasible,
}

/// Read-only state an operator may consult besides the buffer itself.
#[derive(Debug, Clone, Copy)]
pub struct MutationContext<'a> {
    pub corpus: &'a [CorpusEntry],
    pub literals: &'a LiteralTable,
    /// Corpus index the buffer was copied from. Splicing never picks it.
    pub origin: Option<usize>,
}

impl<'a> MutationContext<'a> {
    /// Creates a context with no origin, so every corpus entry may be spliced in.
    pub fn new(corpus: &'a [CorpusEntry], literals: &'a LiteralTable) -> Self {
        Self {
            corpus,
            literals,
            origin: None,
        }
    }

    /// Marks `origin` as the entry the buffer was copied from.
    pub fn with_origin(mut self, origin: usize) -> Self {
        self.origin = Some(origin);
        self
    }
}

/// All operators, drawn with equal weight by the mutator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOperator {
    EraseBytes,
    InsertRandomBytes,
    DuplicateBytes,
    CopyBytes,
    FlipBit,
    RandomizeByte,
    SwapBytes,
    ArithByte,
    ArithU16,
    ArithU32,
    ArithU64,
    InterestingU8,
    InterestingU16,
    InterestingU32,
    ReplaceDigit,
    ReplaceNumber,
    Splice,
    InsertForeignBytes,
    InsertLiteral,
    OverwriteLiteral,
}

impl MutationOperator {
    pub const COUNT: usize = 20;

    /// Operators in id order.
    pub const ALL: [MutationOperator; Self::COUNT] = [
        Self::EraseBytes,
        Self::InsertRandomBytes,
        Self::DuplicateBytes,
        Self::CopyBytes,
        Self::FlipBit,
        Self::RandomizeByte,
        Self::SwapBytes,
        Self::ArithByte,
        Self::ArithU16,
        Self::ArithU32,
        Self::ArithU64,
        Self::InterestingU8,
        Self::InterestingU16,
        Self::InterestingU32,
        Self::ReplaceDigit,
        Self::ReplaceNumber,
        Self::Splice,
        Self::InsertForeignBytes,
        Self::InsertLiteral,
        Self::OverwriteLiteral,
    ];

    /// Looks up an operator by its numeric id.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable numeric id of the operator (its position in [`Self::ALL`]).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Draws an operator uniformly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::COUNT)]
    }

    /// Short snake_case name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::EraseBytes => "erase_bytes",
            Self::InsertRandomBytes => "insert_random_bytes",
            Self::DuplicateBytes => "duplicate_bytes",
            Self::CopyBytes => "copy_bytes",
            Self::FlipBit => "flip_bit",
            Self::RandomizeByte => "randomize_byte",
            Self::SwapBytes => "swap_bytes",
            Self::ArithByte => "arith_byte",
            Self::ArithU16 => "arith_u16",
            Self::ArithU32 => "arith_u32",
            Self::ArithU64 => "arith_u64",
            Self::InterestingU8 => "interesting_u8",
            Self::InterestingU16 => "interesting_u16",
            Self::InterestingU32 => "interesting_u32",
            Self::ReplaceDigit => "replace_digit",
            Self::ReplaceNumber => "replace_number",
            Self::Splice => "splice",
            Self::InsertForeignBytes => "insert_foreign_bytes",
            Self::InsertLiteral => "insert_literal",
            Self::OverwriteLiteral => "overwrite_literal",
        }
    }

    /// Attempts the operator on `buf`.
    pub fn apply<R: Rng + ?Sized>(
        self,
        buf: &mut Vec<u8>,
        rng: &mut R,
        ctx: &MutationContext<'_>,
        tables: &InterestingValues,
    ) -> OperatorOutcome {
        match self {
            Self::EraseBytes => erase_bytes(buf, rng),
            Self::InsertRandomBytes => insert_random_bytes(buf, rng),
            Self::DuplicateBytes => duplicate_bytes(buf, rng),
            Self::CopyBytes => copy_bytes(buf, rng),
            Self::FlipBit => flip_bit(buf, rng),
            Self::RandomizeByte => randomize_byte(buf, rng),
            Self::SwapBytes => swap_bytes(buf, rng),
            Self::ArithByte => arith_byte(buf, rng),
            Self::ArithU16 => arith_u16(buf, rng),
            Self::ArithU32 => arith_u32(buf, rng),
            Self::ArithU64 => arith_u64(buf, rng),
            Self::InterestingU8 => interesting_u8(buf, rng, tables),
            Self::InterestingU16 => interesting_u16(buf, rng, tables),
            Self::InterestingU32 => interesting_u32(buf, rng, tables),
            Self::ReplaceDigit => replace_digit(buf, rng),
            Self::ReplaceNumber => replace_number(buf, rng),
            Self::Splice => splice(buf, rng, ctx),
            Self::InsertForeignBytes => insert_foreign_bytes(buf, rng, ctx),
            Self::InsertLiteral => insert_literal(buf, rng, ctx),
            Self::OverwriteLiteral => overwrite_literal(buf, rng, ctx),
        }
    }
}

/// Chooses the length of a range mutation in `[1, n]`, preferring short ranges.
pub fn choose_len<R: Rng + ?Sized>(rng: &mut R, n: usize) -> usize {
    let n = n.max(1);
    match rng.random_range(0..100u32) {
        0..=89 => rng.random_range(1..=n.min(8)),
        90..=98 => rng.random_range(1..=n.min(32)),
        _ => rng.random_range(1..=n),
    }
}

/// Picks an index in `[0, len)` different from `taken`. Requires `len > 1`.
fn distinct_index<R: Rng + ?Sized>(rng: &mut R, len: usize, taken: usize) -> usize {
    let idx = rng.random_range(0..len - 1);
    if idx >= taken { idx + 1 } else { idx }
}

fn arith_delta<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.random_range(1..=ARITH_MAX)
}

fn erase_bytes<R: Rng + ?Sized>(buf: &mut Vec<u8>, rng: &mut R) -> OperatorOutcome {
    if buf.len() <= 1 {
        return OperatorOutcome::Infeasible;
    }
    let pos0 = rng.random_range(0..buf.len());
    let pos1 = pos0 + choose_len(rng, buf.len() - pos0);
    buf.drain(pos0..pos1);
    OperatorOutcome::Mutated
}

fn insert_random_bytes<R: Rng + ?Sized>(buf: &mut Vec<u8>, rng: &mut R) -> OperatorOutcome {
    let pos = rng.random_range(0..=buf.len());
    let n = choose_len(rng, RANDOM_INSERT_MAX);
    let bytes: Vec<u8> = (0..n).map(|_| rng.random::<u8>()).collect();
    buf.splice(pos..pos, bytes);
    OperatorOutcome::Mutated
}

fn duplicate_bytes<R: Rng + ?Sized>(buf: &mut Vec<u8>, rng: &mut R) -> OperatorOutcome {
    if buf.len() <= 1 {
        return OperatorOutcome::Infeasible;
    }
    let src = rng.random_range(0..buf.len());
    let dst = distinct_index(rng, buf.len(), src);
    let n = choose_len(rng, buf.len() - src);
    let chunk = buf[src..src + n].to_vec();
    buf.splice(dst..dst, chunk);
    OperatorOutcome::Mutated
}

fn copy_bytes<R: Rng + ?Sized>(buf: &mut Vec<u8>, rng: &mut R) -> OperatorOutcome {
    if buf.len() <= 1 {
        return OperatorOutcome::Infeasible;
    }
    let src = rng.random_range(0..buf.len());
    let dst = distinct_index(rng, buf.len(), src);
    // The copy is clipped at the end of the buffer.
    let n = choose_len(rng, buf.len() - src).min(buf.len() - dst);
    buf.copy_within(src..src + n, dst);
    OperatorOutcome::Mutated
}

fn flip_bit<R: Rng + ?Sized>(buf: &mut [u8], rng: &mut R) -> OperatorOutcome {
    if buf.is_empty() {
        return OperatorOutcome::Infeasible;
    }
    let pos = rng.random_range(0..buf.len());
    buf[pos] ^= 1 << rng.random_range(0..8u8);
    OperatorOutcome::Mutated
}

fn randomize_byte<R: Rng + ?Sized>(buf: &mut [u8], rng: &mut R) -> OperatorOutcome {
    if buf.is_empty() {
        return OperatorOutcome::Infeasible;
    }
    let pos = rng.random_range(0..buf.len());
    buf[pos] ^= rng.random_range(1..=u8::MAX);
    OperatorOutcome::Mutated
}

fn swap_bytes<R: Rng + ?Sized>(buf: &mut [u8], rng: &mut R) -> OperatorOutcome {
    if buf.len() <= 1 {
        return OperatorOutcome::Infeasible;
    }
    let src = rng.random_range(0..buf.len());
    let dst = distinct_index(rng, buf.len(), src);
    buf.swap(src, dst);
    OperatorOutcome::Mutated
}

fn arith_byte<R: Rng + ?Sized>(buf: &mut [u8], rng: &mut R) -> OperatorOutcome {
    if buf.is_empty() {
        return OperatorOutcome::Infeasible;
    }
    let pos = rng.random_range(0..buf.len());
    let v = arith_delta(rng);
    buf[pos] = if rng.random_bool(0.5) {
        buf[pos].wrapping_add(v)
    } else {
        buf[pos].wrapping_sub(v)
    };
    OperatorOutcome::Mutated
}

fn arith_u16<R: Rng + ?Sized>(buf: &mut [u8], rng: &mut R) -> OperatorOutcome {
    if buf.len() < 2 {
        return OperatorOutcome::Infeasible;
    }
    let pos = rng.random_range(0..buf.len() - 1);
    let v = u16::from(arith_delta(rng));
    let x = read_u16_le(buf, pos);
    let out = match rng.random_range(0..4u8) {
        0 => x.wrapping_add(v),
        1 => x.wrapping_sub(v),
        2 => swap16(swap16(x).wrapping_add(v)),
        _ => swap16(swap16(x).wrapping_sub(v)),
    };
    write_u16_le(buf, pos, out);
    OperatorOutcome::Mutated
}

fn arith_u32<R: Rng + ?Sized>(buf: &mut [u8], rng: &mut R) -> OperatorOutcome {
    if buf.len() < 4 {
        return OperatorOutcome::Infeasible;
    }
    let pos = rng.random_range(0..buf.len() - 3);
    let v = u32::from(arith_delta(rng));
    let x = read_u32_le(buf, pos);
    let out = match rng.random_range(0..4u8) {
        0 => x.wrapping_add(v),
        1 => x.wrapping_sub(v),
        2 => swap32(swap32(x).wrapping_add(v)),
        _ => swap32(swap32(x).wrapping_sub(v)),
    };
    write_u32_le(buf, pos, out);
    OperatorOutcome::Mutated
}

fn arith_u64<R: Rng + ?Sized>(buf: &mut [u8], rng: &mut R) -> OperatorOutcome {
    if buf.len() < 8 {
        return OperatorOutcome::Infeasible;
    }
    let pos = rng.random_range(0..buf.len() - 7);
    let v = u64::from(arith_delta(rng));
    let x = read_u64_le(buf, pos);
    let out = match rng.random_range(0..4u8) {
        0 => x.wrapping_add(v),
        1 => x.wrapping_sub(v),
        2 => swap64(swap64(x).wrapping_add(v)),
        _ => swap64(swap64(x).wrapping_sub(v)),
    };
    write_u64_le(buf, pos, out);
    OperatorOutcome::Mutated
}

fn interesting_u8<R: Rng + ?Sized>(
    buf: &mut [u8],
    rng: &mut R,
    tables: &InterestingValues,
) -> OperatorOutcome {
    if buf.is_empty() || tables.i8.is_empty() {
        return OperatorOutcome::Infeasible;
    }
    let pos = rng.random_range(0..buf.len());
    buf[pos] = tables.i8[rng.random_range(0..tables.i8.len())] as u8;
    OperatorOutcome::Mutated
}

fn interesting_u16<R: Rng + ?Sized>(
    buf: &mut [u8],
    rng: &mut R,
    tables: &InterestingValues,
) -> OperatorOutcome {
    if buf.len() < 2 || tables.i16.is_empty() {
        return OperatorOutcome::Infeasible;
    }
    let pos = rng.random_range(0..buf.len() - 1);
    let mut v = tables.i16[rng.random_range(0..tables.i16.len())] as u16;
    if rng.random_bool(0.5) {
        v = swap16(v);
    }
    write_u16_le(buf, pos, v);
    OperatorOutcome::Mutated
}

fn interesting_u32<R: Rng + ?Sized>(
    buf: &mut [u8],
    rng: &mut R,
    tables: &InterestingValues,
) -> OperatorOutcome {
    if buf.len() < 4 || tables.i32.is_empty() {
        return OperatorOutcome::Infeasible;
    }
    let pos = rng.random_range(0..buf.len() - 3);
    let mut v = tables.i32[rng.random_range(0..tables.i32.len())] as u32;
    if rng.random_bool(0.5) {
        v = swap32(v);
    }
    write_u32_le(buf, pos, v);
    OperatorOutcome::Mutated
}

fn replace_digit<R: Rng + ?Sized>(buf: &mut [u8], rng: &mut R) -> OperatorOutcome {
    let digits: Vec<usize> = buf
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_ascii_digit())
        .map(|(i, _)| i)
        .collect();
    if digits.is_empty() {
        return OperatorOutcome::Infeasible;
    }
    let pos = digits[rng.random_range(0..digits.len())];
    buf[pos] = b'0' + rng.random_range(0..10u8);
    OperatorOutcome::Mutated
}

/// Maximal runs of at least two ASCII digits, as half-open ranges.
fn number_runs(buf: &[u8]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (i, b) in buf.iter().enumerate() {
        match (b.is_ascii_digit(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s > 1 {
                    runs.push((s, i));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if buf.len() - s > 1 {
            runs.push((s, buf.len()));
        }
    }
    runs
}

fn replace_number<R: Rng + ?Sized>(buf: &mut Vec<u8>, rng: &mut R) -> OperatorOutcome {
    let runs = number_runs(buf);
    if runs.is_empty() {
        return OperatorOutcome::Infeasible;
    }
    let (start, end) = runs[rng.random_range(0..runs.len())];
    let v: i64 = match rng.random_range(0..4u8) {
        0 => rng.random_range(0..1000),
        1 => rng.random_range(0..1 << 30),
        2 => rng.random_range(0..1i64 << 30) * rng.random_range(0..1i64 << 30),
        _ => -rng.random_range(0..1000i64),
    };
    buf.splice(start..end, v.to_string().into_bytes());
    OperatorOutcome::Mutated
}

/// Picks a corpus entry other than the buffer's origin, or `None` if there is none.
fn pick_foreign<'a, R: Rng + ?Sized>(
    rng: &mut R,
    ctx: &MutationContext<'a>,
) -> Option<&'a CorpusEntry> {
    let corpus = ctx.corpus;
    if corpus.len() < 2 {
        return None;
    }
    let idx = match ctx.origin {
        Some(origin) if origin < corpus.len() => distinct_index(rng, corpus.len(), origin),
        _ => rng.random_range(0..corpus.len()),
    };
    Some(&corpus[idx])
}

fn splice<R: Rng + ?Sized>(
    buf: &mut [u8],
    rng: &mut R,
    ctx: &MutationContext<'_>,
) -> OperatorOutcome {
    if buf.len() < 4 {
        return OperatorOutcome::Infeasible;
    }
    let Some(other) = pick_foreign(rng, ctx).map(|e| e.data.as_slice()) else {
        return OperatorOutcome::Infeasible;
    };
    if other.len() < 4 {
        return OperatorOutcome::Infeasible;
    }

    let prefix = buf
        .iter()
        .zip(other.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = buf
        .iter()
        .rev()
        .zip(other.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    // Prefix and suffix may overlap, hence the signed arithmetic.
    let common = (prefix + suffix) as isize;
    let diff = (buf.len() as isize - common).min(other.len() as isize - common);
    if diff < 4 {
        return OperatorOutcome::Infeasible;
    }
    let n = rng.random_range(0..diff as usize - 2) + 1;
    buf[prefix..prefix + n].copy_from_slice(&other[prefix..prefix + n]);
    OperatorOutcome::Mutated
}

fn insert_foreign_bytes<R: Rng + ?Sized>(
    buf: &mut Vec<u8>,
    rng: &mut R,
    ctx: &MutationContext<'_>,
) -> OperatorOutcome {
    let Some(other) = pick_foreign(rng, ctx).map(|e| e.data.as_slice()) else {
        return OperatorOutcome::Infeasible;
    };
    if other.len() < 4 {
        return OperatorOutcome::Infeasible;
    }
    let pos0 = rng.random_range(0..=buf.len());
    let pos1 = rng.random_range(0..other.len() - 2);
    let n = choose_len(rng, other.len() - pos1 - 2) + 2;
    buf.splice(pos0..pos0, other[pos1..pos1 + n].iter().copied());
    OperatorOutcome::Mutated
}

fn insert_literal<R: Rng + ?Sized>(
    buf: &mut Vec<u8>,
    rng: &mut R,
    ctx: &MutationContext<'_>,
) -> OperatorOutcome {
    let Some(lit) = ctx.literals.draw(rng).filter(|l| !l.is_empty()) else {
        return OperatorOutcome::Infeasible;
    };
    let pos = rng.random_range(0..=buf.len());
    buf.splice(pos..pos, lit);
    OperatorOutcome::Mutated
}

fn overwrite_literal<R: Rng + ?Sized>(
    buf: &mut [u8],
    rng: &mut R,
    ctx: &MutationContext<'_>,
) -> OperatorOutcome {
    let Some(lit) = ctx.literals.draw(rng).filter(|l| !l.is_empty()) else {
        return OperatorOutcome::Infeasible;
    };
    if lit.len() >= buf.len() {
        return OperatorOutcome::Infeasible;
    }
    let pos = rng.random_range(0..buf.len() - lit.len());
    buf[pos..pos + lit.len()].copy_from_slice(&lit);
    OperatorOutcome::Mutated
}
