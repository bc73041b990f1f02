//! Example command: plan an image resize from a signature declared in Rust.

use sigcli::{BoundArgs, Command, Param, SchemaError, Signature, TypeExpr, Value};

sigcli::cli_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Fit { Contain, Cover, Stretch }
}

const DOC: &str = "
    Plan an image resize without touching the file.

    Prints the output dimensions the resize would produce.

    Args:
        src: Image to resize
        size: Target box as width and height
        fit: How the image is fitted into the box
        scale: Extra factor applied to the target box
        upscale: Allow the result to be larger than the source
    ";

fn command() -> Result<Command<anyhow::Result<()>>, SchemaError> {
    let signature = Signature::new()
        .param(Param::new("src").annotated(TypeExpr::Str))
        .param(Param::new("size").annotated(TypeExpr::tuple([TypeExpr::Int, TypeExpr::Int])))
        .param(
            Param::new("fit")
                .keyword_only()
                .annotated(TypeExpr::enum_of::<Fit>())
                .default(Value::enum_of(&Fit::Cover)),
        )
        .param(Param::new("scale").default(1.0))
        .param(Param::new("upscale").default(false));

    Ok(Command::new("sigcli-demo", &signature, plan)?
        .with_doc_comment(DOC)
        .version(env!("CARGO_PKG_VERSION")))
}

fn plan(args: BoundArgs) -> anyhow::Result<()> {
    let src: String = args.get("src")?;
    let (width, height): (i64, i64) = args.get("size")?;
    let fit: Fit = args.get("fit")?;
    let scale: f64 = args.get("scale")?;
    let upscale: bool = args.get("upscale")?;

    anyhow::ensure!(width > 0 && height > 0, "size must be positive, got {width}x{height}");
    anyhow::ensure!(scale > 0.0, "scale must be positive, got {scale}");

    let scaled = |n: i64| (n as f64 * scale).round() as i64;
    println!(
        "{src}: {fit:?} into {}x{}{}",
        scaled(width),
        scaled(height),
        if upscale { " (upscaling allowed)" } else { "" }
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    command()?.run()
}
