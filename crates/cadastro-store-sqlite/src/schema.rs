//! SQL schema for the cadastro SQLite store.
//!
//! Executed once at connection startup. Column order of `pessoas` matches
//! the declared persisted schema, the same order the tabular-file backend
//! writes.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS pessoas (
    id            INTEGER PRIMARY KEY,   -- assigned as max(id)+1, never AUTOINCREMENT
    nome          TEXT NOT NULL,
    cpf           TEXT,
    nascimento    TEXT,                  -- YYYY-MM-DD, as captured; may be blank
    email         TEXT,
    telefone      TEXT,
    tipo          TEXT,
    matricula     TEXT,
    classe        TEXT,
    sala          TEXT,
    ano_ingresso  TEXT,
    cep           TEXT,
    rua           TEXT,
    numero        TEXT,
    complemento   TEXT,
    bairro        TEXT,
    cidade        TEXT,
    estado        TEXT,
    data_cadastro TEXT NOT NULL          -- YYYY-MM-DD; set at creation, immutable
);

CREATE TABLE IF NOT EXISTS usuarios (
    id         INTEGER PRIMARY KEY,
    login      TEXT NOT NULL UNIQUE,
    senha_hash TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS pessoas_cpf_idx    ON pessoas(cpf);
CREATE INDEX IF NOT EXISTS pessoas_classe_idx ON pessoas(classe);
";
