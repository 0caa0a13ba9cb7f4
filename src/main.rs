//! # mathsvg CLI
//!
//! Usage:
//!   mathsvg input.mml --font STIXTwoMath-Regular.otf -o output.svg
//!   echo '<math>...</math>' | mathsvg --font font.otf
//!   mathsvg --latex 'x^2 + 1' --font font.otf -o out.svg
//!   mathsvg --example > quadratic.mml

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use mathsvg::{font::FontCache, render, render_latex, RenderConfig};

fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.windows(2).find(|w| w[0] == name).map(|w| w[1].clone())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--example") {
        print!("{}", example_mathml());
        return;
    }
    if args.len() < 2 || args.iter().any(|a| a == "--help" || a == "-h") {
        eprint!("{}", usage());
        std::process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let font_path = match flag_value(&args, "--font") {
        Some(p) => p,
        None => {
            eprintln!("✗ Missing required --font <path> (an OpenType font with a MATH table)");
            std::process::exit(1);
        }
    };

    let latex = flag_value(&args, "--latex");
    let input = if let Some(expr) = &latex {
        expr.clone()
    } else if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1]).expect("Failed to read input file")
    } else {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .expect("Failed to read stdin");
        buf
    };

    let mut config = RenderConfig::default();
    if let Some(size) = flag_value(&args, "--size") {
        config.font_size = size.parse().expect("--size expects a number");
    }
    if let Some(precision) = flag_value(&args, "--precision") {
        config.precision = precision.parse().expect("--precision expects an integer");
    }
    if let Some(color) = flag_value(&args, "--color") {
        config.color = Some(color);
    }
    if args.iter().any(|a| a == "--inline") {
        config.symbol_reuse = false;
    }
    if args.iter().any(|a| a == "--defs") {
        config.defs = true;
    }
    if args.iter().any(|a| a == "--debug-bbox") {
        config.debug_bbox = true;
        config.debug_baseline = true;
    }
    let display = !args.iter().any(|a| a == "--latex-inline");

    let font_data = FontCache::global()
        .load(Path::new(&font_path))
        .unwrap_or_else(|e| {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        });

    let result = if latex.is_some() {
        render_latex(&input, display, &font_data, &config)
    } else {
        render(&input, &font_data, &config)
    };

    match result {
        Ok(svg) => match flag_value(&args, "-o") {
            Some(output_path) => {
                fs::write(&output_path, &svg).expect("Failed to write SVG");
                eprintln!("✓ Written {} bytes to {}", svg.len(), output_path);
            }
            None => println!("{}", svg),
        },
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn usage() -> &'static str {
    "mathsvg: render MathML or LaTeX math to SVG

Usage:
  mathsvg <input.mml> --font <font.otf> [options]
  mathsvg --latex '<expression>' --font <font.otf> [options]
  mathsvg --example

Input is read from stdin when no file is given.

Options:
  --font <path>       OpenType font with a MATH table (required)
  -o <path>           Output file (default: stdout)
  --latex <expr>      Treat input as LaTeX instead of MathML
  --latex-inline      LaTeX inline (text) style instead of display style
  --size <pt>         Base font size in points (default 24)
  --precision <n>     Decimal places in SVG coordinates (default 4)
  --color <color>     Default draw color
  --inline            Inline glyph paths instead of <symbol>/<use> (SVG 1.1)
  --defs              Collect <symbol> definitions under <defs>
  --debug-bbox        Stroke bounding boxes and baselines
"
}

fn example_mathml() -> &'static str {
    r#"<math display="block">
  <mi>x</mi>
  <mo>=</mo>
  <mfrac>
    <mrow>
      <mo>&#x2212;</mo>
      <mi>b</mi>
      <mo>&#xB1;</mo>
      <msqrt>
        <msup>
          <mi>b</mi>
          <mn>2</mn>
        </msup>
        <mo>&#x2212;</mo>
        <mn>4</mn>
        <mi>a</mi>
        <mi>c</mi>
      </msqrt>
    </mrow>
    <mrow>
      <mn>2</mn>
      <mi>a</mi>
    </mrow>
  </mfrac>
</math>
"#
}
