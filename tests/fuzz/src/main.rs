use fontcore::{Font, GlyphId, GlyphMetrics};
use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::prelude::{IteratorRandom, ThreadRng};
use rand::rng;
use rayon::iter::IntoParallelRefIterator;
use rayon::iter::ParallelIterator;
use skrifa::instance::{LocationRef, Size};
use skrifa::outline::{DrawSettings, OutlinePen};
use skrifa::MetadataProvider;
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

// Note that this is not really meant as an example for how to use this crate, but
// rather just so that we can conveniently run the fuzzer.

const NUM_ITERATIONS: usize = 200;

fn main() {
    let exclude_fonts = [
        // Color font.
        "NotoColorEmojiCompatTest-Regular.ttf",
    ];

    let paths = walkdir::WalkDir::new(std::env::var("FONTS_DIR").unwrap())
        .into_iter()
        .map(|p| p.unwrap().path().to_path_buf())
        .filter(|p| {
            let extension = p.extension().and_then(OsStr::to_str);
            extension == Some("ttf")
                && !exclude_fonts.contains(&p.file_name().unwrap().to_str().unwrap())
        })
        .collect::<Vec<_>>();

    loop {
        println!("Starting an iteration...");

        paths.par_iter().for_each(|path| {
            let mut rng = rng();
            if let Err(msg) = run_test(path, &mut rng) {
                println!("Error while fuzzing {path:?}: {msg}");
            }
        });
    }
}

fn run_test(path: &Path, rng: &mut ThreadRng) -> Result<(), String> {
    let data = fs::read(path).map_err(|_| "failed to read file".to_string())?;
    let ttf_face = ttf_parser::Face::parse(&data, 0)
        .map_err(|_| "failed to parse ttf face".to_string())?;
    let skrifa_face = skrifa::FontRef::new(&data)
        .map_err(|_| "failed to parse skrifa face".to_string())?;
    let font = Font::from_bytes(data.as_slice())
        .map_err(|e| format!("failed to load font: {e}"))?;

    let num_glyphs = ttf_face.number_of_glyphs();
    if font.glyph_count() != num_glyphs {
        return Err(format!("glyph count {} != {num_glyphs}", font.glyph_count()));
    }

    check_cmap(&font, &ttf_face)?;

    let possible_gids = (0..num_glyphs).collect::<Vec<_>>();
    let dist = get_distribution(num_glyphs);

    for _ in 0..NUM_ITERATIONS {
        let num = dist.sample(rng);
        let sample = possible_gids.iter().copied().choose_multiple(rng, num);

        glyph_metrics(&font, &ttf_face, &sample)?;
        glyph_outlines(&font, &skrifa_face, &sample)
            .map_err(|g| format!("outline bounds didn't match for gid {g}"))?;
        kerning(&font, &ttf_face, &sample)?;
    }

    Ok(())
}

fn get_distribution(num_glyphs: u16) -> WeightedIndex<usize> {
    let mut weights = vec![0];

    for i in 1..num_glyphs.max(2) {
        if i <= 10 {
            weights.push(8000);
        } else if i <= 50 {
            weights.push(16000);
        } else if i <= 200 {
            weights.push(6000);
        } else if i <= 2000 {
            weights.push(100);
        } else {
            weights.push(2);
        }
    }

    WeightedIndex::new(&weights).unwrap()
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

fn check_cmap(font: &Font, face: &ttf_parser::Face) -> Result<(), String> {
    let mut code_points = vec![];
    if let Some(cmap) = face.tables().cmap {
        for subtable in cmap.subtables {
            if subtable.is_unicode() {
                subtable.codepoints(|c| code_points.push(c));
            }
        }
    }

    for c in code_points.into_iter().filter_map(char::from_u32) {
        let expected = face.glyph_index(c).map(|g| g.0).filter(|&g| g != 0);
        let found = font.find_glyph(c as u32);
        let found = found.is_found().then_some(found.0).filter(|&g| g != 0);
        if found != expected {
            return Err(format!("cmap mismatch for {c:?}: {found:?} != {expected:?}"));
        }
    }

    Ok(())
}

fn glyph_metrics(font: &Font, face: &ttf_parser::Face, gids: &[u16]) -> Result<(), String> {
    let units = f32::from(font.units_per_em());

    for &glyph in gids {
        // Broken glyphs come back as zero metrics; anything that parses must agree.
        let Ok(metrics) = font.get_metrics(GlyphId(glyph)) else {
            continue;
        };
        if metrics == GlyphMetrics::default() {
            continue;
        }
        let id = ttf_parser::GlyphId(glyph);

        if let Some(advance) = face.glyph_hor_advance(id) {
            if !close(metrics.advance * units, f32::from(advance)) {
                return Err(format!("glyph hor advance for glyph {glyph} didn't match."));
            }
        }

        if let Some(bbox) = face.glyph_bounding_box(id) {
            let rect = metrics.bounding_rectangle;
            if !close(rect.min.x * units, f32::from(bbox.x_min))
                || !close(rect.max.y * units, f32::from(bbox.y_max))
            {
                return Err(format!("glyph bounding box for glyph {glyph} didn't match."));
            }
        }
    }

    Ok(())
}

fn glyph_outlines(font: &Font, face: &skrifa::FontRef, gids: &[u16]) -> Result<(), u16> {
    let units = f32::from(font.units_per_em());
    let outlines = face.outline_glyphs();

    for &glyph in gids {
        let Ok(path) = font.get_path(GlyphId(glyph)) else {
            continue;
        };
        let Some(outline) = outlines.get(skrifa::GlyphId::new(u32::from(glyph))) else {
            continue;
        };

        let mut sink = Sink::default();
        let settings = DrawSettings::unhinted(Size::unscaled(), LocationRef::default());
        if outline.draw(settings, &mut sink).is_err() {
            continue;
        }

        let Some([x0, y0, x1, y1]) = sink.0 else {
            if path.is_empty() {
                continue;
            }
            return Err(glyph);
        };
        let bbox = path.bounding_box();
        if !close(bbox.min.x * units, x0)
            || !close(bbox.min.y * units, y0)
            || !close(bbox.max.x * units, x1)
            || !close(bbox.max.y * units, y1)
        {
            return Err(glyph);
        }
    }

    Ok(())
}

fn kerning(font: &Font, face: &ttf_parser::Face, gids: &[u16]) -> Result<(), String> {
    let Some(kern) = face.tables().kern else {
        return Ok(());
    };
    let units = f32::from(font.units_per_em());

    for pair in gids.windows(2) {
        let (left, right) = (ttf_parser::GlyphId(pair[0]), ttf_parser::GlyphId(pair[1]));
        let expected: i32 = kern
            .subtables
            .into_iter()
            .filter(|s| s.horizontal && !s.variable)
            .filter_map(|s| s.glyphs_kerning(left, right))
            .map(i32::from)
            .sum();
        let actual = font.kerning(GlyphId(pair[0]), GlyphId(pair[1]));
        if !close(actual.x * units, expected as f32) {
            return Err(format!("kerning for {pair:?} didn't match."));
        }
    }

    Ok(())
}

/// Collects the bounds of every point the pen visits.
#[derive(Debug, Default, PartialEq)]
struct Sink(Option<[f32; 4]>);

impl Sink {
    fn add(&mut self, x: f32, y: f32) {
        let b = self.0.get_or_insert([x, y, x, y]);
        *b = [b[0].min(x), b[1].min(y), b[2].max(x), b[3].max(y)];
    }
}

impl OutlinePen for Sink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.add(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.add(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.add(x1, y1);
        self.add(x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.add(x1, y1);
        self.add(x2, y2);
        self.add(x, y);
    }

    fn close(&mut self) {}
}
