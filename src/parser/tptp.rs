//! TPTP parser for `fof` and `cnf` units
//!
//! Parsing happens in two stages: nom combinators build a name-based syntax
//! tree, and a resolution pass interns symbols and numbers variables. The
//! numbering is per unit, in order of first binding, so the outermost
//! quantified variable of each unit gets index 0, matching the numeric
//! discipline the fluted classifiers read.

use super::fof::{FOFFormula, FormulaRole, FormulaUnit, Quantifier};
use crate::logic::{
    Clause, ClauseRole, Constant, FunctionSymbol, Interner, Literal, PredicateSymbol, Term,
    Variable,
};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace1, not_line_ending},
    combinator::{map, opt, recognize, value},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

/// A parsed problem: formula units and/or input clauses.
#[derive(Debug, Default)]
pub struct Problem {
    pub formulas: Vec<FormulaUnit>,
    pub clauses: Vec<Clause>,
}

impl Problem {
    /// True when the input came entirely in clausal form.
    pub fn is_clausal(&self) -> bool {
        self.formulas.is_empty()
    }
}

/// Parse a TPTP problem from a string.
pub fn parse_problem(input: &str, interner: &mut Interner) -> Result<Problem, String> {
    let (rest, units) =
        parse_units(input).map_err(|e| format!("TPTP parse error: {:?}", e))?;
    let (rest, _) = ws(rest).map_err(|e| format!("TPTP parse error: {:?}", e))?;
    if !rest.is_empty() {
        return Err(format!(
            "TPTP parse error: unconsumed input near '{}'",
            &rest[..rest.len().min(40)]
        ));
    }

    let mut problem = Problem::default();
    for unit in units {
        match unit {
            UnitAst::Fof { name, role, formula } => {
                let role = FormulaRole::from_tptp(role);
                let mut scope = VarScope::default();
                let resolved = resolve_formula(&formula, interner, &mut scope)?;
                // Close over implicitly universal free variables
                let resolved = scope.close(resolved);
                // Conjectures are refuted: negate up front
                let (role, formula) = if role == FormulaRole::Conjecture {
                    (
                        FormulaRole::NegatedConjecture,
                        FOFFormula::Not(Box::new(resolved)),
                    )
                } else {
                    (role, resolved)
                };
                problem.formulas.push(FormulaUnit {
                    name: name.to_string(),
                    role,
                    formula,
                });
            }
            UnitAst::Cnf { name: _, role, literals } => {
                let mut scope = VarScope::default();
                let mut resolved = Vec::with_capacity(literals.len());
                for lit in &literals {
                    resolved.push(resolve_literal(lit, interner, &mut scope)?);
                }
                let mut clause = Clause::with_role(resolved, ClauseRole::from_tptp_role(role));
                clause.renumber_variables();
                problem.clauses.push(clause);
            }
        }
    }

    Ok(problem)
}

// =========================================================================
// Syntax trees (name-based, produced by nom)
// =========================================================================

#[derive(Debug, Clone)]
enum PTerm<'a> {
    Var(&'a str),
    App(&'a str, Vec<PTerm<'a>>),
}

#[derive(Debug, Clone)]
enum PFormula<'a> {
    True,
    False,
    Atom(&'a str, Vec<PTerm<'a>>),
    Eq(PTerm<'a>, PTerm<'a>, bool),
    Not(Box<PFormula<'a>>),
    Binary(BinOp, Box<PFormula<'a>>, Box<PFormula<'a>>),
    Quant(Quantifier, Vec<&'a str>, Box<PFormula<'a>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    And,
    Or,
    Implies,
    ReverseImplies,
    Iff,
    Xor,
}

#[derive(Debug, Clone)]
struct PLiteral<'a> {
    polarity: bool,
    atom: PFormula<'a>,
}

#[derive(Debug)]
enum UnitAst<'a> {
    Fof {
        name: &'a str,
        role: &'a str,
        formula: PFormula<'a>,
    },
    Cnf {
        name: &'a str,
        role: &'a str,
        literals: Vec<PLiteral<'a>>,
    },
}

// =========================================================================
// nom combinators
// =========================================================================

/// Whitespace and `%` line comments
fn ws(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), pair(char('%'), not_line_ending)),
        ))),
    )(input)
}

fn lower_word(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_lowercase()),
        many0(take_while1(|c: char| c.is_alphanumeric() || c == '_')),
    ))(input)
}

fn upper_word(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_uppercase()),
        many0(take_while1(|c: char| c.is_alphanumeric() || c == '_')),
    ))(input)
}

fn unit_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

fn parse_units(input: &str) -> IResult<&str, Vec<UnitAst>> {
    many0(preceded(ws, parse_unit))(input)
}

fn parse_unit(input: &str) -> IResult<&str, UnitAst> {
    alt((parse_fof_unit, parse_cnf_unit))(input)
}

fn parse_fof_unit(input: &str) -> IResult<&str, UnitAst> {
    let (input, _) = tag("fof")(input)?;
    let (input, _) = tuple((ws, char('('), ws))(input)?;
    let (input, name) = unit_name(input)?;
    let (input, _) = tuple((ws, char(','), ws))(input)?;
    let (input, role) = lower_word(input)?;
    let (input, _) = tuple((ws, char(','), ws))(input)?;
    let (input, formula) = parse_formula(input)?;
    let (input, _) = tuple((ws, char(')'), ws, char('.')))(input)?;
    Ok((input, UnitAst::Fof { name, role, formula }))
}

fn parse_cnf_unit(input: &str) -> IResult<&str, UnitAst> {
    let (input, _) = tag("cnf")(input)?;
    let (input, _) = tuple((ws, char('('), ws))(input)?;
    let (input, name) = unit_name(input)?;
    let (input, _) = tuple((ws, char(','), ws))(input)?;
    let (input, role) = lower_word(input)?;
    let (input, _) = tuple((ws, char(','), ws))(input)?;
    // The disjunction may or may not be wrapped in its own parentheses
    let (input, literals) = alt((
        delimited(
            pair(char('('), ws),
            separated_list1(tuple((ws, char('|'), ws)), parse_cnf_literal),
            pair(ws, char(')')),
        ),
        separated_list1(tuple((ws, char('|'), ws)), parse_cnf_literal),
    ))(input)?;
    let (input, _) = tuple((ws, char(')'), ws, char('.')))(input)?;
    Ok((input, UnitAst::Cnf { name, role, literals }))
}

fn parse_cnf_literal(input: &str) -> IResult<&str, PLiteral> {
    let (input, negation) = opt(pair(char('~'), ws))(input)?;
    let (input, atom) = parse_atomic(input)?;
    // Infix (in)equality flips under an outer ~
    let (polarity, atom) = match atom {
        PFormula::Eq(l, r, pos) => (negation.is_none() == pos, PFormula::Eq(l, r, true)),
        other => (negation.is_none(), other),
    };
    Ok((input, PLiteral { polarity, atom }))
}

/// Binary formula level; associativity follows the rightward chain
fn parse_formula(input: &str) -> IResult<&str, PFormula> {
    let (input, left) = parse_unary(input)?;
    let (input, _) = ws(input)?;

    // Longest operators first so <=> is not read as <=
    let op_parser = alt((
        value(BinOp::Iff, tag("<=>")),
        value(BinOp::Xor, tag("<~>")),
        value(BinOp::Implies, tag("=>")),
        value(BinOp::ReverseImplies, tag("<=")),
        value(BinOp::Or, char('|')),
        value(BinOp::And, char('&')),
    ));

    let (input, rhs) = opt(pair(op_parser, preceded(ws, parse_formula)))(input)?;
    match rhs {
        None => Ok((input, left)),
        Some((BinOp::ReverseImplies, right)) => Ok((
            input,
            PFormula::Binary(BinOp::Implies, Box::new(right), Box::new(left)),
        )),
        Some((op, right)) => Ok((
            input,
            PFormula::Binary(op, Box::new(left), Box::new(right)),
        )),
    }
}

fn parse_unary(input: &str) -> IResult<&str, PFormula> {
    alt((
        map(preceded(pair(char('~'), ws), parse_unary), |f| {
            PFormula::Not(Box::new(f))
        }),
        parse_quantified,
        delimited(
            pair(char('('), ws),
            parse_formula,
            pair(ws, char(')')),
        ),
        parse_atomic,
    ))(input)
}

fn parse_quantified(input: &str) -> IResult<&str, PFormula> {
    let (input, quantifier) = alt((
        value(Quantifier::Forall, char('!')),
        value(Quantifier::Exists, char('?')),
    ))(input)?;
    let (input, _) = tuple((ws, char('['), ws))(input)?;
    let (input, vars) = separated_list1(tuple((ws, char(','), ws)), upper_word)(input)?;
    let (input, _) = tuple((ws, char(']'), ws, char(':'), ws))(input)?;
    let (input, body) = parse_unary(input)?;
    Ok((input, PFormula::Quant(quantifier, vars, Box::new(body))))
}

fn parse_atomic(input: &str) -> IResult<&str, PFormula> {
    alt((
        value(PFormula::True, tag("$true")),
        value(PFormula::False, tag("$false")),
        parse_infix_equality,
        parse_plain_atom,
    ))(input)
}

fn parse_infix_equality(input: &str) -> IResult<&str, PFormula> {
    let (input, left) = parse_term(input)?;
    let (input, _) = ws(input)?;
    let (input, positive) = alt((value(false, tag("!=")), value(true, char('='))))(input)?;
    let (input, _) = ws(input)?;
    let (input, right) = parse_term(input)?;
    Ok((input, PFormula::Eq(left, right, positive)))
}

fn parse_plain_atom(input: &str) -> IResult<&str, PFormula> {
    let (input, name) = lower_word(input)?;
    let (input, args) = opt(delimited(
        pair(char('('), ws),
        separated_list1(tuple((ws, char(','), ws)), parse_term),
        pair(ws, char(')')),
    ))(input)?;
    Ok((input, PFormula::Atom(name, args.unwrap_or_default())))
}

fn parse_term(input: &str) -> IResult<&str, PTerm> {
    alt((
        map(upper_word, PTerm::Var),
        |input| {
            let (input, name) = lower_word(input)?;
            let (input, args) = opt(delimited(
                pair(char('('), ws),
                separated_list1(tuple((ws, char(','), ws)), parse_term),
                pair(ws, char(')')),
            ))(input)?;
            Ok((input, PTerm::App(name, args.unwrap_or_default())))
        },
    ))(input)
}

// =========================================================================
// Resolution: names to interned symbols, variables to per-unit indices
// =========================================================================

#[derive(Default)]
struct VarScope {
    /// Quantifier-bound names, stack discipline
    bindings: Vec<(String, Variable)>,
    /// Implicitly universal names; these outlive quantifier scopes
    free: Vec<(String, Variable)>,
    next: u32,
}

impl VarScope {
    fn bind(&mut self, name: &str) -> Variable {
        let var = Variable(self.next);
        self.next += 1;
        self.bindings.push((name.to_string(), var));
        var
    }

    fn unbind_to(&mut self, depth: usize) {
        self.bindings.truncate(depth);
    }

    /// Resolve an occurrence; unbound names become implicitly universal.
    fn occurrence(&mut self, name: &str) -> Variable {
        if let Some((_, var)) = self.bindings.iter().rev().find(|(n, _)| n == name) {
            return *var;
        }
        if let Some((_, var)) = self.free.iter().find(|(n, _)| n == name) {
            return *var;
        }
        let var = Variable(self.next);
        self.next += 1;
        self.free.push((name.to_string(), var));
        var
    }

    /// Wrap a formula in a universal closure over its free variables.
    fn close(&mut self, formula: FOFFormula) -> FOFFormula {
        if self.free.is_empty() {
            formula
        } else {
            let vars = self.free.drain(..).map(|(_, v)| v).collect();
            FOFFormula::Quantified(Quantifier::Forall, vars, Box::new(formula))
        }
    }
}

fn resolve_formula(
    formula: &PFormula,
    interner: &mut Interner,
    scope: &mut VarScope,
) -> Result<FOFFormula, String> {
    match formula {
        PFormula::True => Ok(FOFFormula::True),
        PFormula::False => Ok(FOFFormula::False),
        PFormula::Atom(name, args) => {
            let terms = args
                .iter()
                .map(|a| resolve_term(a, interner, scope))
                .collect::<Result<Vec<_>, _>>()?;
            let pred = PredicateSymbol::new(interner.intern_predicate(name), terms.len() as u8);
            Ok(FOFFormula::Atom(pred, terms))
        }
        PFormula::Eq(left, right, positive) => {
            let l = resolve_term(left, interner, scope)?;
            let r = resolve_term(right, interner, scope)?;
            let eq = PredicateSymbol::new(interner.intern_predicate("="), 2);
            let atom = FOFFormula::Atom(eq, vec![l, r]);
            Ok(if *positive {
                atom
            } else {
                FOFFormula::Not(Box::new(atom))
            })
        }
        PFormula::Not(f) => Ok(FOFFormula::Not(Box::new(resolve_formula(
            f, interner, scope,
        )?))),
        PFormula::Binary(op, f1, f2) => {
            let left = Box::new(resolve_formula(f1, interner, scope)?);
            let right = Box::new(resolve_formula(f2, interner, scope)?);
            Ok(match op {
                BinOp::And => FOFFormula::And(left, right),
                BinOp::Or => FOFFormula::Or(left, right),
                BinOp::Implies | BinOp::ReverseImplies => FOFFormula::Implies(left, right),
                BinOp::Iff => FOFFormula::Iff(left, right),
                BinOp::Xor => FOFFormula::Xor(left, right),
            })
        }
        PFormula::Quant(q, names, f) => {
            let depth = scope.bindings.len();
            let vars: Vec<Variable> = names.iter().map(|n| scope.bind(n)).collect();
            let body = resolve_formula(f, interner, scope)?;
            scope.unbind_to(depth);
            Ok(FOFFormula::Quantified(*q, vars, Box::new(body)))
        }
    }
}

fn resolve_literal(
    literal: &PLiteral,
    interner: &mut Interner,
    scope: &mut VarScope,
) -> Result<Literal, String> {
    let resolved = resolve_formula(&literal.atom, interner, scope)?;
    match resolved {
        FOFFormula::Atom(pred, args) => Ok(if literal.polarity {
            Literal::positive(pred, args)
        } else {
            Literal::negative(pred, args)
        }),
        other => Err(format!("expected an atom in a cnf unit, got {}", other)),
    }
}

fn resolve_term(
    term: &PTerm,
    interner: &mut Interner,
    scope: &mut VarScope,
) -> Result<Term, String> {
    match term {
        PTerm::Var(name) => Ok(Term::Variable(scope.occurrence(name))),
        PTerm::App(name, args) if args.is_empty() => Ok(Term::Constant(Constant::new(
            interner.intern_constant(name),
        ))),
        PTerm::App(name, args) => {
            let terms = args
                .iter()
                .map(|a| resolve_term(a, interner, scope))
                .collect::<Result<Vec<_>, _>>()?;
            let f = FunctionSymbol::new(interner.intern_function(name), terms.len() as u8);
            Ok(Term::Function(f, terms))
        }
    }
}
