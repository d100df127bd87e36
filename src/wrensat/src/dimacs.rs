/*****************************************************************************************[dimacs.rs]
wrensat -- a CDCL SAT solver

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

use {
    crate::{interface::SolverInterface, Lit},
    std::io::{self, BufRead},
    thiserror::Error,
};

/// Errors raised while reading a DIMACS CNF problem.
///
/// All of these are reported before solving begins; a solver populated by
/// a failed parse must not be solved.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("I/O error while reading DIMACS input: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("malformed problem header (expected `p cnf <vars> <clauses>`)")]
    BadHeader,
    #[error("header declares {declared} clauses but {found} were read")]
    ClauseCountMismatch { declared: i32, found: i32 },
    #[error("literal {lit} references a variable beyond the declared count {declared}")]
    VarOutOfRange { lit: i32, declared: i32 },
}

/// `parse(input, solver, is_strict)` adds the content of `input` to the solver.
///
/// Literals that reference a variable beyond the count declared in the
/// header are always rejected. With `is_strict`, a mismatch between the
/// declared and actual number of clauses is an error too.
pub fn parse<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
    is_strict: bool,
) -> Result<(), ParseError> {
    let mut lits = vec![];
    let mut num_vars = 0;
    let mut num_clauses = 0;
    let mut num_read_clauses = 0;
    loop {
        skip_whitespace(input)?;
        let ch = next_byte(input)?;
        if ch == Some(b'p') {
            let mut header = [0; 5];
            input.read_exact(&mut header)?;
            if &header != b"p cnf" {
                return Err(ParseError::BadHeader);
            }
            num_vars = parse_int(input)?;
            num_clauses = parse_int(input)?;
            if num_vars < 0 || num_clauses < 0 {
                return Err(ParseError::BadHeader);
            }
        } else if ch == Some(b'c') {
            skip_line(input)?;
        } else if ch.is_some() {
            read_clause(input, solver, num_vars, &mut lits)?;
            solver.add_clause_reuse(&mut lits);
            num_read_clauses += 1;
        } else {
            break;
        }
    }
    if is_strict && num_clauses != num_read_clauses {
        return Err(ParseError::ClauseCountMismatch {
            declared: num_clauses,
            found: num_read_clauses,
        });
    }
    Ok(())
}

fn read_clause<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
    num_vars: i32,
    lits: &mut Vec<Lit>,
) -> Result<(), ParseError> {
    lits.clear();
    loop {
        let parsed_lit = parse_int(input)?;
        if parsed_lit == 0 {
            return Ok(());
        }
        if num_vars > 0 && parsed_lit.abs() > num_vars {
            return Err(ParseError::VarOutOfRange {
                lit: parsed_lit,
                declared: num_vars,
            });
        }
        let var = (parsed_lit.abs() - 1) as u32;
        let lit = Lit::new(solver.var_of_int(var), parsed_lit > 0);
        lits.push(lit);
    }
}

fn parse_int<R: BufRead>(input: &mut R) -> Result<i32, ParseError> {
    skip_whitespace(input)?;
    let ch = next_byte(input)?;
    let neg = if ch == Some(b'+') || ch == Some(b'-') {
        input.consume(1);
        ch == Some(b'-')
    } else {
        false
    };
    match next_byte(input)? {
        Some(ch) if !ch.is_ascii_digit() => return Err(ParseError::UnexpectedChar(ch as char)),
        None => return Err(ParseError::UnexpectedEof),
        _ => (),
    }
    let mut val = 0;
    while let Some(ch) = next_byte(input)? {
        if !ch.is_ascii_digit() {
            break;
        }
        input.consume(1);
        val = val * 10 + (ch - b'0') as i32;
    }
    if neg {
        Ok(-val)
    } else {
        Ok(val)
    }
}

#[inline(always)]
fn is_whitespace(ch: Option<u8>) -> bool {
    ch.map(|ch| (b'\x09' <= ch && ch <= b'\x0d') || ch == b' ')
        .unwrap_or(false)
}

fn skip_whitespace<R: BufRead>(input: &mut R) -> Result<(), ParseError> {
    while is_whitespace(next_byte(input)?) {
        input.consume(1);
    }
    Ok(())
}

fn skip_line<R: BufRead>(input: &mut R) -> Result<(), ParseError> {
    loop {
        match next_byte(input)? {
            Some(ch) => {
                input.consume(1);
                if ch == b'\n' {
                    return Ok(());
                }
            }
            None => return Ok(()),
        }
    }
}

fn next_byte<R: BufRead>(input: &mut R) -> Result<Option<u8>, ParseError> {
    Ok(input.fill_buf()?.first().copied())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{lbool, BasicSolver};

    fn parse_str(s: &str, strict: bool) -> Result<BasicSolver, ParseError> {
        let mut solver = BasicSolver::default();
        parse(&mut s.as_bytes(), &mut solver, strict)?;
        Ok(solver)
    }

    #[test]
    fn test_parse_simple_cnf() {
        let solver = parse_str("c a comment\np cnf 3 2\n1 -2 0\n2 3 0\n", true)
            .expect("well-formed input");
        assert_eq!(solver.num_vars(), 3);
        assert_eq!(solver.num_clauses(), 2);
    }

    #[test]
    fn test_parse_then_solve() {
        let mut solver = parse_str("p cnf 2 3\n1 2 0\n-1 2 0\n-2 0\n", true)
            .expect("well-formed input");
        assert_eq!(solver.solve_limited(), lbool::FALSE);
    }

    #[test]
    fn test_bad_header_is_rejected() {
        let res = parse_str("p dnf 3 2\n1 2 0\n", false);
        assert!(matches!(res, Err(ParseError::BadHeader)));
    }

    #[test]
    fn test_out_of_range_literal_is_rejected() {
        let res = parse_str("p cnf 2 1\n1 3 0\n", false);
        match res {
            Err(ParseError::VarOutOfRange { lit, declared }) => {
                assert_eq!(lit, 3);
                assert_eq!(declared, 2);
            }
            other => panic!("expected VarOutOfRange, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_clause_count_checked_in_strict_mode() {
        let res = parse_str("p cnf 2 2\n1 2 0\n", true);
        assert!(matches!(
            res,
            Err(ParseError::ClauseCountMismatch {
                declared: 2,
                found: 1
            })
        ));
        // without strict mode the mismatch is tolerated
        assert!(parse_str("p cnf 2 2\n1 2 0\n", false).is_ok());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let res = parse_str("p cnf 2 1\n1 x 0\n", false);
        assert!(matches!(res, Err(ParseError::UnexpectedChar('x'))));
    }
}
