use crate::FHashMap;
use crate::errors::Error;

/// Maps Subversion author handles to Git identities.
///
/// One line per entry:
///
/// ```text
/// handle = Display Name <email>
/// handle @rev = Display Name <email>
/// handle @first:last = Display Name <email>
/// ```
///
/// Entries with a revision range only apply within that range, which
/// allows a handle to be reused by different people over time.
pub(crate) struct UserMap {
    map: FHashMap<String, Vec<UserMapEntry>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct UserMapEntry {
    rev_range: std::ops::RangeInclusive<u32>,
    name: String,
    email: String,
}

impl UserMap {
    #[cfg(test)]
    pub(crate) fn new() -> Self {
        Self {
            map: FHashMap::default(),
        }
    }

    pub(crate) fn parse(src: &mut dyn std::io::BufRead, src_name: &str) -> Result<Self, Error> {
        let mut map = FHashMap::<String, Vec<_>>::default();

        let mut line = String::new();
        let mut line_i = 0usize;
        loop {
            line.clear();
            let n = src
                .read_line(&mut line)
                .map_err(|e| Error::io(format!("failed to read {src_name}"), e))?;
            if n == 0 {
                break;
            }
            line_i += 1;

            match parse_line(&line) {
                Some(Some((user, entry))) => {
                    map.entry(user).or_default().push(entry);
                }
                Some(None) => {}
                None => {
                    return Err(Error::malformed(
                        format!("{src_name} line {line_i}"),
                        format!("{:?} is not \"handle = Name <email>\"", line.trim_end()),
                    ));
                }
            }
        }

        tracing::debug!("loaded {} authors from {src_name}", map.len());

        Ok(Self { map })
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, user: &str, name: &str, email: &str) {
        self.map.entry(user.into()).or_default().push(UserMapEntry {
            rev_range: 0..=u32::MAX,
            name: name.into(),
            email: email.into(),
        });
    }

    pub(crate) fn get(&self, user: &str, rev: u32) -> Option<(&str, &str)> {
        self.map
            .get(user)
            .and_then(|entries| entries.iter().find(|entry| entry.rev_range.contains(&rev)))
            .map(|entry| (entry.name.as_str(), entry.email.as_str()))
    }
}

fn parse_line(line: &str) -> Option<Option<(String, UserMapEntry)>> {
    let rem = line.trim_matches([' ', '\t', '\r', '\n']);
    if rem.is_empty() || rem.starts_with('#') {
        return Some(None);
    }

    let user_len = rem.find([' ', '\t', '=']).filter(|&l| l != 0)?;
    let token = &rem[..user_len];
    let mut rem = rem[user_len..].trim_start_matches([' ', '\t']);

    // A handle may itself contain '@' (e.g. "jdoe@example.org"), so an
    // attached suffix is only a range when it parses as one.
    let (user, mut rev_range) = match token
        .rsplit_once('@')
        .and_then(|(user, range)| Some((user, parse_rev_range(range)?)))
    {
        Some((user, rev_range)) if !user.is_empty() => (user, rev_range),
        _ => (token, 0..=u32::MAX),
    };

    if let Some(range_rem) = rem.strip_prefix('@') {
        let range_len = range_rem.find([' ', '\t', '='])?;
        rev_range = parse_rev_range(&range_rem[..range_len])?;
        rem = range_rem[range_len..].trim_start_matches([' ', '\t']);
    }

    let rem = rem.strip_prefix('=')?;
    let (name, rem) = rem.split_once('<')?;
    let (email, rem) = rem.split_once('>')?;
    if !rem.trim_matches([' ', '\t']).is_empty() || email.contains('<') {
        return None;
    }

    Some(Some((
        user.into(),
        UserMapEntry {
            rev_range,
            name: name.trim().into(),
            email: email.into(),
        },
    )))
}

fn parse_rev_range(range: &str) -> Option<std::ops::RangeInclusive<u32>> {
    match range.split_once(':') {
        Some((start, end)) => Some(start.parse().ok()?..=end.parse().ok()?),
        None => {
            let rev = range.parse().ok()?;
            Some(rev..=rev)
        }
    }
}
