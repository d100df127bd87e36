extern crate wrensat;

use wrensat::{gen, lbool, BasicSolver, SolverInterface};

fn solve_php(pigeons: u32, holes: u32) -> lbool {
    let mut solver = BasicSolver::default();
    gen::load_into(&mut solver, &gen::pigeonhole(pigeons, holes));
    solver.solve_limited()
}

#[test]
fn php_2_1_is_unsat() {
    assert_eq!(solve_php(2, 1), lbool::FALSE);
}

#[test]
fn php_1_2_is_sat() {
    assert_eq!(solve_php(1, 2), lbool::TRUE);
}

#[test]
fn php_is_unsat_with_one_hole_less() {
    for n in 2..6 {
        assert_eq!(solve_php(n + 1, n), lbool::FALSE, "PHP({}, {})", n + 1, n);
    }
}

#[test]
fn php_is_sat_with_enough_holes() {
    for n in 1..6 {
        assert_eq!(solve_php(n, n), lbool::TRUE, "PHP({}, {})", n, n);
    }
}

#[test]
fn php_empty_clause_is_detected_before_search() {
    // a pigeon with no hole produces an empty clause
    let mut solver = BasicSolver::default();
    assert!(!gen::load_into(&mut solver, &gen::pigeonhole(1, 0)));
    assert!(!solver.is_ok());
    assert_eq!(solver.solve_limited(), lbool::FALSE);
}
