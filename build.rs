use vergen_gitcl::{CargoBuilder, Emitter, GitclBuilder};

fn main() -> Result<(), Box<dyn std::error::Error>> {
	Emitter::default()
		.idempotent()
		.add_instructions(&CargoBuilder::all_cargo()?)?
		.add_instructions(&GitclBuilder::all_git()?)?
		.emit()?;

	Ok(())
}
