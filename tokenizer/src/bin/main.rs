// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::fs::File;
use std::io::Read;

use jsonlex::{JsonListener, Tokenizer};

/// Prints one line per event, indented by nesting depth.
struct Dump {
    depth: usize,
}

impl Dump {
    fn line(&self, text: &str) {
        println!("{:indent$}{}", "", text, indent = self.depth * 2);
    }
}

impl JsonListener for Dump {
    fn start_object(&mut self) {
        self.line("{");
        self.depth += 1;
    }
    fn end_object(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }
    fn start_array(&mut self) {
        self.line("[");
        self.depth += 1;
    }
    fn end_array(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("]");
    }
    fn key(&mut self, key: &str) {
        self.line(&format!("key {key:?}"));
    }
    fn value(&mut self, value: &str) {
        self.line(&format!("value {value:?}"));
    }
}

fn main() {
    let args: Vec<_> = env::args().collect();
    if args.len() != 2 {
        println!("Usage: {} file.json", args[0]);
        std::process::exit(1);
    }
    let path = &args[1];
    let mut data = Vec::new();
    let mut f = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Error: Unable to open file '{}': {}", path, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = f.read_to_end(&mut data) {
        eprintln!("Error: Unable to read file '{}': {}", path, e);
        std::process::exit(1);
    }

    let mut tokenizer: Tokenizer<u32, 256> = Tokenizer::new();
    match tokenizer.parse_full(&data, &mut Dump { depth: 0 }) {
        Err(e) => {
            eprintln!("Error: JSON parsing failed: {}", e);
            std::process::exit(1);
        }
        Ok(consumed) => eprintln!("{} bytes", consumed),
    };
}
