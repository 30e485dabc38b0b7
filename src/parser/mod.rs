//! TPTP parsing and clausification

pub mod cnf;
pub mod fof;
pub mod tptp;

pub use cnf::fof_to_cnf;
pub use fof::{FOFFormula, FormulaRole, FormulaUnit, Quantifier};
pub use tptp::{parse_problem, Problem};
