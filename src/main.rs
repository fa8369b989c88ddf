use anyhow::anyhow;
use clap::Parser;

use flatsym::dae::OdeModel;
use flatsym::s1_flat::StoredDefinition;
use flatsym::s2_analyzer::tree::node::{Node, Visitable};
use flatsym::s2_analyzer::tree::repr_visitor::ReprVisitor;
use flatsym::s3_symbolic::{rows, SymMatrix};
use flatsym::s4_generator;

#[derive(Parser, Debug)]
#[command(version, about = "Flat model to Sympy translator", long_about = None)]
struct Args {
    /// Renders a custom minijinja template instead of the built-in one
    #[arg(short, long)]
    template: Option<String>,

    /// The flat tree *.json file to translate
    #[arg(name = "FLAT_TREE_JSON")]
    flat_tree: String,

    /// The class to generate
    #[arg(name = "MODEL_NAME")]
    model_name: String,

    /// Reduce and linearize the model, print A, B, C and D
    #[arg(short, long, default_value_t = false)]
    linearize: bool,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn print_matrix(name: &str, m: &SymMatrix) {
    println!("{} ({}x{}) =", name, m.nrows(), m.ncols());
    for row in rows(m) {
        let entries: Vec<String> = row.iter().map(|e| e.to_string()).collect();
        println!("  [{}]", entries.join(", "));
    }
}

fn main() -> anyhow::Result<()> {
    flatsym::init_logger();
    let args = Args::parse();
    let txt = std::fs::read_to_string(&args.flat_tree)?;
    let def = StoredDefinition::from_json(&txt)?;
    log::info!("loaded {} classes from {}", def.classes.len(), args.flat_tree);
    let bar = "=".repeat(40);

    if args.verbose {
        println!("\n\n{}", bar);
        println!("FLAT TREE");
        println!("{}", bar);
        let mut repr_visitor = ReprVisitor::default();
        def.accept(&mut repr_visitor, None);
        if let Some(repr) = repr_visitor.repr.get(&def.id()) {
            println!("{}", repr);
        }

        let (unit, _) = s4_generator::build_unit(&def)?;
        println!("\n\n{}", bar);
        println!("UNIT");
        println!("{}", bar);
        println!("{}", serde_json::to_string_pretty(&unit)?);
    }

    let s = s4_generator::generate(&def, &args.model_name, args.template.as_deref())?;
    println!("{s:}");

    if args.linearize {
        let class = def
            .classes
            .get(&args.model_name)
            .ok_or_else(|| anyhow!("model '{}' not found", args.model_name))?;
        let model = OdeModel::from_class(class)?;
        log::info!("reduced {} to {} state derivatives", class.name, model.f.len());
        let lin = model.linearize()?;

        println!("\n\n{}", bar);
        println!("LINEARIZATION");
        println!("{}", bar);
        print_matrix("A", &lin.a);
        print_matrix("B", &lin.b);
        print_matrix("C", &lin.c);
        print_matrix("D", &lin.d);
    }

    Ok(())
}
