use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    trial_folds::example_apps::run_kfold_demo(std::env::args().skip(1))
}
