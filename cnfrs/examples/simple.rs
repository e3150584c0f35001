use cnfrs::manager::{options::CnfOptions, FormulaManager};

fn main() {
    let options = CnfOptions::builder()
        // Give the atoms indices 1, 2, and 3 up-front.
        .variables(["a".to_string(), "b".to_string(), "c".to_string()])
        .build();
    let manager = FormulaManager::new(options);

    let a = manager.atom("a");
    let b = manager.atom("b");
    let c = manager.atom("c");

    // (a & b & c) <=> !(a | b)
    let a_and_b_and_c = manager.and(manager.and(a, b), c);
    let formula = manager.iff(a_and_b_and_c, manager.not(manager.or(a, b)));
    println!("formula: {}", manager.display(formula));

    let cnf = manager.to_cnf(formula).unwrap();
    print!("{}", cnf.to_dimacs());
    println!("{}", manager.statistics());
}
