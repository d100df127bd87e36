/*****************************************************************************************[gen.rs]
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

//! Generators for standard clause families, in the DIMACS signed-integer
//! convention. Mostly useful for benchmarks and tests.

use crate::{interface::SolverInterface, Lit};

/// CNF encoding of the pigeonhole principle PHP(pigeons, holes).
///
/// Variable `p * holes + h + 1` means "pigeon `p` sits in hole `h`". The
/// clauses say every pigeon sits in at least one hole, and no two pigeons
/// share a hole; the formula is satisfiable iff `pigeons <= holes`.
pub fn pigeonhole(pigeons: u32, holes: u32) -> Vec<Vec<i32>> {
    let var = |p: u32, h: u32| (p * holes + h + 1) as i32;
    let mut clauses = vec![];

    // each pigeon sits in at least one hole
    for p in 0..pigeons {
        clauses.push((0..holes).map(|h| var(p, h)).collect());
    }

    // no two pigeons share a hole
    for p in 0..pigeons {
        for q in p + 1..pigeons {
            for h in 0..holes {
                clauses.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }

    clauses
}

/// Add clauses in the DIMACS integer convention to a solver, creating
/// variables as needed. Returns `false` once the solver became UNSAT.
pub fn load_into<S: SolverInterface>(solver: &mut S, clauses: &[Vec<i32>]) -> bool {
    let mut lits = vec![];
    for clause in clauses {
        lits.clear();
        for &i in clause {
            debug_assert_ne!(i, 0);
            let var = solver.var_of_int((i.abs() - 1) as u32);
            lits.push(Lit::new(var, i > 0));
        }
        if !solver.add_clause_reuse(&mut lits) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pigeonhole_shape() {
        // 3 pigeons, 2 holes: 3 at-least-one clauses and 2*3 conflict pairs
        let clauses = pigeonhole(3, 2);
        assert_eq!(clauses.len(), 3 + 3 * 2);
        assert!(clauses[0].iter().all(|&l| l > 0));
        assert!(clauses[3..].iter().all(|c| c.len() == 2));
        let max_var = clauses
            .iter()
            .flat_map(|c| c.iter())
            .map(|l| l.abs())
            .max()
            .unwrap();
        assert_eq!(max_var, 6);
    }

    #[test]
    fn test_pigeonhole_degenerate_sizes() {
        // no pigeons: nothing to constrain
        assert!(pigeonhole(0, 3).is_empty());
        // pigeons but no holes: one empty at-least-one clause per pigeon
        let clauses = pigeonhole(2, 0);
        assert_eq!(clauses.len(), 2);
        assert!(clauses.iter().all(|c| c.is_empty()));
    }
}
