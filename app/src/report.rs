use std::{
    io::Write,
    path::{Path, PathBuf},
};

use filmfluency_core::ScoredDialogue;

const REPORT_SUFFIX: &str = "_important.csv";
const REPORT_HEADER: [&str; 5] = ["index", "start", "end", "text", "score"];

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("could not create report {path:?}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// `movie.en.srt` -> `movie.en_important.csv`, next to the subtitles.
pub fn report_path(subtitle_path: &Path) -> PathBuf {
    let stem = subtitle_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    subtitle_path.with_file_name(format!("{}{}", stem, REPORT_SUFFIX))
}

/// Write one row per dialogue. The header is always written, even with no rows.
pub fn write_dialogues<W: Write>(w: W, dialogues: &[ScoredDialogue]) -> Result<(), ReportError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(w);
    wtr.write_record(REPORT_HEADER)?;
    for d in dialogues {
        wtr.serialize(d)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_report(path: &Path, dialogues: &[ScoredDialogue]) -> Result<(), ReportError> {
    let f = std::fs::File::create(path).map_err(|source| ReportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_dialogues(std::io::BufWriter::new(f), dialogues)?;
    log::info!("saved {} important dialogues to {:?}", dialogues.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use filmfluency_core::Timecode;

    use super::*;

    fn render(dialogues: &[ScoredDialogue]) -> String {
        let mut buf = Vec::new();
        write_dialogues(&mut buf, dialogues).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_only_when_empty() {
        assert_eq!(render(&[]), "index,start,end,text,score\n");
    }

    #[test]
    fn rows_in_order() {
        let dialogues = vec![
            ScoredDialogue {
                index: 3,
                start: Timecode::new(0, 1, 0, 500),
                end: Timecode::new(0, 1, 2, 0),
                text: "Quoted, with a comma".to_owned(),
                score: 12.5,
            },
            ScoredDialogue {
                index: 1,
                start: Timecode::new(1, 0, 0, 0),
                end: Timecode::new(1, 0, 3, 250),
                text: "plain".to_owned(),
                score: -3.0,
            },
        ];
        assert_eq!(
            render(&dialogues),
            "index,start,end,text,score\n\
             3,00:01:00.500,00:01:02.000,\"Quoted, with a comma\",12.5\n\
             1,01:00:00.000,01:00:03.250,plain,-3.0\n"
        );
    }

    #[test]
    fn report_lives_next_to_subtitles() {
        assert_eq!(
            report_path(Path::new("/movies/heat.en.srt")),
            PathBuf::from("/movies/heat.en_important.csv")
        );
        assert_eq!(
            report_path(Path::new("subs.txt")),
            PathBuf::from("subs_important.csv")
        );
    }

    #[test]
    fn save_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        save_report(&path, &[]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "index,start,end,text,score\n"
        );
    }
}
