fn main() -> anyhow::Result<()> {
    radiology_simplifier::run()
}
