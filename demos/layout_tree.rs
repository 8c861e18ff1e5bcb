// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use biparse::atom::{element_in_range, item};
use biparse::fold::as_string;
use biparse::input::input_of_reader;
use biparse::layout::{line_indent, Deep, LayoutPattern};
use biparse::pattern::{Pattern, PatternExt};
use biparse::surd::Repeat;
use clap::Parser as ClapParser;
use std::path::PathBuf;
use anyhow::{Result, bail};


#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Print the tree in bracketed form
    #[clap(short, long, value_parser)]
    tree: bool,
    /// Print the outline again, indenting blocks by this many spaces
    #[clap(long, value_parser)]
    reindent: Option<usize>,
    /// Report all layout errors instead of stopping at the first
    #[clap(short, long, value_parser)]
    collect: bool,
    /// Path to the input file
    #[clap(value_parser, required(true))]
    input_path: PathBuf,
}

fn count_nodes(node: &Deep<String, char>) -> usize {
    node.children().iter().map(|c| 1 + count_nodes(c)).sum()
}

fn main() -> Result<()> {
    let args = Args::parse();

    let word = Repeat::new(as_string(),
                           element_in_range('a'..='z') | element_in_range('A'..='Z')
                           | element_in_range('0'..='9') | item('-') | item('_'));
    let outline = LayoutPattern::new(word, item(':'), line_indent())
        .indent_step(args.reindent.unwrap_or(1));

    let file = args.input_path.to_string_lossy();
    let fh = std::fs::File::open(&args.input_path)?;
    let root = if args.collect {
        let mut input = input_of_reader(fh, &file)?.collect_errors();
        let root = outline.read(&mut input)?;
        if let Some(e) = input.feed_mut().take_io_error() {
            return Err(e)
        }
        let errors = input.take_errors();
        for e in &errors {
            match &e.location {
                Some(loc) => eprintln!("{loc}: {}", e.message),
                None => eprintln!("{}", e.message)
            }
        }
        if !errors.is_empty() {
            bail!("{} layout errors in {:?}", errors.len(), args.input_path)
        }
        root
    } else {
        outline.read_from(fh, &file)?
    };
    let root = match root {
        Some(root) => root,
        None => bail!("no outline in {:?}", args.input_path)
    };

    if args.tree {
        println!("{root}");
    }
    if args.reindent.is_some() {
        print!("{}", outline.show_string(&root)?);
    }
    println!(";; count_toplevel = {}, count_nodes = {}",
             root.children().len(), count_nodes(&root));
    Ok(())
}
