/// Where a column's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Raw pass-through of a record field.
    Field(&'static str),
    /// The record's `HTMLContent`, flattened to text.
    HtmlText,
    /// Filled in by a builder (line numbers, article fields, segment labels).
    Computed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
}

impl SqlType {
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub source: Source,
}

impl Column {
    const fn field(name: &'static str) -> Self {
        Self { name, sql_type: SqlType::Text, source: Source::Field(name) }
    }

    const fn text(name: &'static str) -> Self {
        Self { name, sql_type: SqlType::Text, source: Source::Computed }
    }

    const fn int(name: &'static str) -> Self {
        Self { name, sql_type: SqlType::Integer, source: Source::Computed }
    }
}

/// An output table: its storage name and ordered columns.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }
}

pub const HTML_FIELD: &str = "HTMLContent";
pub const META_ID: &str = "MetaId";
pub const GAZETTE_ID: &str = "GazetteId";

pub const GAZETTE: Table = Table {
    name: "gazette",
    columns: &[
        Column::field(META_ID),
        Column::field("Doc_Style_LName"),
        Column::field("Doc_Style_SName"),
        Column::field("Chapter"),
        Column::field("PubGov"),
        Column::field("PubGovName"),
        Column::field("UndertakeGov"),
        Column::field("Officer_name"),
        Column::field("Date_Created"),
        Column::field("Date_Published"),
        Column::field(GAZETTE_ID),
        Column::field("Title"),
        Column::field("ThemeSubject"),
        Column::field("Keyword"),
        Column::field("Explain"),
        Column::field("Category"),
        Column::field("Service"),
        Column::field("GazetteHTML"),
        Column { name: "HTMLContentText", sql_type: SqlType::Text, source: Source::HtmlText },
    ],
};

pub const LINES: Table = Table {
    name: "lines",
    columns: &[
        Column::text(META_ID),
        Column::text(GAZETTE_ID),
        Column::int("LineNo"),
        Column::text("Text"),
    ],
};

pub const ARTICLES: Table = Table {
    name: "articles",
    columns: &[
        Column::text(META_ID),
        Column::text(GAZETTE_ID),
        Column::text("ArticleNo"),
        Column::text("TitleLine"),
        Column::int("LineStart"),
        Column::int("LineEnd"),
        Column::text("Text"),
    ],
};

pub const PDF_TEXT: Table = Table {
    name: "pdf_text",
    columns: &[
        Column::text("SourceFile"),
        Column::int("Page"),
        Column::int("SegmentNo"),
        Column::text("Type"),
        Column::text("Text"),
    ],
};
