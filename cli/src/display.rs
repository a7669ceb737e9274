use phrasedex_core::vector_space::RankedResult;
use phrasedex_core::{PositionalIndex, VectorSpace, WeightField};
use std::io::{self, Write};

const PRECISION: usize = 9;

/// Plain-text table with a ruled header row.
struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new<I: IntoIterator<Item = S>, S: Into<String>>(header: I) -> Self {
        Self { rows: vec![header.into_iter().map(Into::into).collect()] }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn write<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let cols = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; cols];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        let rule: String = widths.iter().map(|w| format!("+{}", "-".repeat(w + 2))).collect::<String>() + "+";
        writeln!(out, "{rule}")?;
        for (r, row) in self.rows.iter().enumerate() {
            for (i, &width) in widths.iter().enumerate() {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                write!(out, "| {cell:<width$} ")?;
            }
            writeln!(out, "|")?;
            if r == 0 {
                writeln!(out, "{}", rule.replace('-', "="))?;
            }
        }
        writeln!(out, "{rule}")
    }
}

fn num(v: f64) -> String {
    let s = format!("{v:.PRECISION$}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn banner<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "\n{} {title} {}", "-".repeat(40), "-".repeat(40))
}

pub fn write_index<W: Write>(index: &PositionalIndex, out: &mut W) -> io::Result<()> {
    for list in index.dictionary.values() {
        writeln!(out, "\n{} Term {}", "*".repeat(25), "*".repeat(25))?;
        writeln!(out, "Term: '{}', Document Frequency: {}", list.term, list.df())?;
        for p in &list.postings {
            let name = index.document(p.doc_id).map(|d| d.name()).unwrap_or_else(|| p.doc_id.to_string());
            writeln!(out, "{}", "-".repeat(50))?;
            writeln!(out, "Document: '{name}', Frequency: {}", p.frequency)?;
            writeln!(out, "Positions: {:?}", p.positions)?;
        }
    }
    Ok(())
}

pub fn write_vector_space<W: Write>(space: &VectorSpace, out: &mut W) -> io::Result<()> {
    writeln!(out, "{} Vector Space {}", "=".repeat(40), "=".repeat(40))?;
    write_weights(space, WeightField::Tf, out)?;
    write_weights(space, WeightField::WTf, out)?;

    banner(out, "Document Frequency")?;
    let mut df = Table::new(["Term", "DF", "IDF"]);
    for (term, data) in &space.terms {
        df.push(vec![term.clone(), data.df.to_string(), num(data.idf)]);
    }
    df.write(out)?;

    write_weights(space, WeightField::TfIdf, out)?;

    banner(out, "Document Length")?;
    let mut lengths = Table::new(["Document", "Length"]);
    for doc in &space.documents {
        lengths.push(vec![doc.name(), num(space.document_length(doc.id))]);
    }
    lengths.write(out)?;

    write_weights(space, WeightField::NormTfIdf, out)
}

fn write_weights<W: Write>(space: &VectorSpace, field: WeightField, out: &mut W) -> io::Result<()> {
    banner(out, field.title())?;
    let header = std::iter::once("Term".to_string())
        .chain(space.documents.iter().map(|d| format!("{} (id {})", d.name(), d.id)));
    let mut table = Table::new(header);
    for (term, data) in &space.terms {
        let mut row = vec![term.clone()];
        row.extend(space.documents.iter().map(|d| match field {
            WeightField::Tf => data.weight(field, d.id).to_string(),
            _ => num(data.weight(field, d.id)),
        }));
        table.push(row);
    }
    table.write(out)
}

pub fn write_query<W: Write>(index: &PositionalIndex, ranked: &RankedResult, out: &mut W) -> io::Result<()> {
    banner(out, "Query Result")?;
    let mut terms = Table::new(["term", "tf", "df", "idf", "w_tf", "tf-idf", "norm_tf-idf"]);
    for q in &ranked.terms {
        terms.push(vec![
            q.term.clone(),
            q.tf.to_string(),
            q.df.to_string(),
            num(q.idf),
            num(q.w_tf),
            num(q.tf_idf),
            num(q.norm_tf_idf),
        ]);
    }
    terms.write(out)?;
    writeln!(out, "Query length: {}", num(ranked.length))?;

    banner(out, "Ranked Result")?;
    if ranked.hits.is_empty() {
        return writeln!(out, "no matches");
    }
    let mut table = Table::new(["Document", "Position", "cosine_similarity"]);
    for hit in &ranked.hits {
        let name = index
            .document(hit.candidate.doc_id)
            .map(|d| d.name())
            .unwrap_or_else(|| hit.candidate.doc_id.to_string());
        table.push(vec![name, hit.candidate.position.to_string(), num(hit.score)]);
    }
    table.write(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_drop_trailing_zeros() {
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(0.0), "0");
        assert_eq!(num(2.0), "2");
        assert_eq!(num(1.0 / 3.0), "0.333333333");
        assert_eq!(num(-0.0000000001), "0");
    }

    #[test]
    fn table_pads_columns() {
        let mut t = Table::new(["a", "bb"]);
        t.push(vec!["ccc".into(), "d".into()]);
        let mut buf = Vec::new();
        t.write(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "+-----+----+\n| a   | bb |\n+=====+====+\n| ccc | d  |\n+-----+----+\n"
        );
    }
}
