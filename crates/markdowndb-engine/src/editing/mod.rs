/*!
 * # Fix Engine
 *
 * Turns a [`Fix`](crate::validation::Fix) suggested by the validator into a
 * concrete text patch over the raw document.
 *
 * ## Model
 *
 * - The raw text is the single source of truth. The engine takes it by
 *   reference and hands back a new copy; it never touches a parsed document.
 * - Each fix compiles to exactly one xi-rope `Delta` (one replaced span),
 *   applied to a rope built from the input.
 * - The caller's cursor is remapped through the same span: offsets before
 *   stay, offsets inside collapse to the span start, offsets after shift.
 * - A fix whose target is gone (the text changed since validation) is a
 *   no-op, never a partial edit.
 *
 * ## Usage
 *
 * ```rust
 * use markdowndb_engine::{Schema, apply_fix, parse, validate};
 *
 * let text = "<JOB>\nTITLE: Engineer\n# REQUIRED_SKILLS\n- Go\n</JOB>\n";
 * let report = validate(&parse(text), &Schema::job());
 * let (_, fix) = report.fixes().next().unwrap();
 *
 * // COMPANY is missing; the fix inserts an empty COMPANY line to fill in.
 * let patch = apply_fix(text, fix, 0);
 * assert_eq!(parse(&patch.text).field("COMPANY"), Some(""));
 * ```
 */

pub mod fix;
pub mod patch;

pub use fix::{FixError, apply_fix, try_apply_fix};
pub use patch::{Patch, remap_cursor};
