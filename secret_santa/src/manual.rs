/*!

This is the long-form manual for `secret_santa` and the `secret-santa` program.

## Input formats

Both files are comma separated, with a header row. Column order does not matter
and extra columns are ignored.

### Roster

The people taking part this year.

| Column            | Content                        |
|-------------------|--------------------------------|
| `Employee_Name`   | display name                   |
| `Employee_EmailID`| email, must be unique          |

### History

The pairings of a previous round. This is exactly the format of the output, so
last year's download can be used directly as this year's history. Several
history files may be given: a giver never gets any of their previous recipients.

| Column                | Content                         |
|-----------------------|---------------------------------|
| `Employee_Name`       | name of the giver               |
| `Employee_EmailID`    | email of the giver              |
| `Secret_Child_Name`   | name of the recipient           |
| `Secret_Child_EmailID`| email of the recipient          |

Rows with a missing email are skipped. Pairings for people who are not in the
roster any more have no effect.

## Output

The same four columns as the history, one row per roster entry, in roster order.
The suggested file name is `secret_santa_assignments.csv`.

## The draw

Every giver, in roster order, takes the first acceptable person from a shuffled
copy of the roster. A person is acceptable if they are not the giver, have not
been picked already and were not one of the giver's previous recipients.
If someone is left with nobody acceptable, the draw starts over with a new
shuffle. After `maxAttempts` failed shuffles (1000 by default) the draw is
declared infeasible. This happens for instance with a single participant, or
with two participants when one of them already gave to the other.

Passing a seed (`--seed`, or `randomSeed` in the configuration) makes the draw
reproducible.

## Configuration file

```json
{
  "rosterFile": "roster.csv",
  "historyFiles": ["history_2023.csv"],
  "outputSettings": { "outputFile": "secret_santa_assignments.csv" },
  "rules": {
    "maxAttempts": 1000,
    "randomSeed": "42",
    "duplicateEmails": "reject"
  }
}
```

Paths are relative to the directory of the configuration file. `duplicateEmails`
is either `reject` (default) or `allowDistinct`.

## Web mode

`secret-santa --serve 8080` starts a small web page on `http://127.0.0.1:8080`
with the same workflow: upload the roster, optionally upload a history, generate,
check the preview and download the result. Nothing is stored on the server
beyond the running process.

*/
