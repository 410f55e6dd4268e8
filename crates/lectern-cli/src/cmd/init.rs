use anyhow::Result;

pub fn run(name: Option<String>) -> Result<()> {
    lectern_init::run(name)
}
