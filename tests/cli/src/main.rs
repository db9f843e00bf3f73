use fontcore::Font;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use unicode_normalization::char::is_combining_mark;

/// Split text into graphemes, attaching combining marks to the preceding base.
fn graphemes(text: &str) -> Vec<String> {
    let mut graphemes: Vec<String> = vec![];
    for c in text.chars() {
        match graphemes.last_mut() {
            Some(last) if is_combining_mark(c) => last.push(c),
            _ => graphemes.push(c.to_string()),
        }
    }
    graphemes
}

// Note that this is more of an experimental CLI used for inspecting fonts.
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let Some(path) = args.get(1) else {
        eprintln!("usage: {} <font> [text]", args[0]);
        return ExitCode::FAILURE;
    };
    let text = args.get(2).map(String::as_str).unwrap_or("Hello");

    let font = match Font::from_source(PathBuf::from(path)) {
        Ok(font) => font,
        Err(err) => {
            log::error!("failed to load {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let identity = font.identity();
    println!("family:     {}", identity.family_name);
    println!("sub-family: {}", identity.sub_family_name);
    println!("weight:     {}", identity.weight);
    println!("style:      {}", identity.style);
    println!(
        "flags:      condensed={} monospace={} serif={}",
        identity.condensed, identity.monospace, identity.serif
    );
    println!("features:   {}", identity.features);
    println!("glyphs:     {} ({} units per em)", font.glyph_count(), font.units_per_em());
    println!("cmap:       {} ranges", font.char_map().len());
    println!("metrics:    {:?}", font.metrics());

    let graphemes = graphemes(text);
    let run = font.shape_run("en", "Latn", &graphemes);
    println!("\n{text:?} is {} em wide", run.width());

    let mut glyph = 0;
    for (grapheme, (&count, advance)) in
        graphemes.iter().zip(run.glyph_count_per_grapheme.iter().zip(&run.advances))
    {
        for _ in 0..count {
            let id = run.glyphs[glyph];
            let points = font.get_path(id).map(|path| path.points.len()).unwrap_or_default();
            println!(
                "{grapheme:?}\t{id:?}\tx={:.4}\tadvance={advance:.4}\tpoints={points}",
                run.glyph_positions[glyph].x,
            );
            glyph += 1;
        }
    }

    ExitCode::SUCCESS
}
