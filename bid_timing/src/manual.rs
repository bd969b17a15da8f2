/*!

This is the long-form manual for `bid_timing` and `btgc`.

## Input format

The bids are collected with a form. Each response is one row of the input
sheet (`Form Responses` by default). The first row is the header and is
skipped. The columns are:

| column | content |
|--------|---------|
| A | timestamp |
| B | contact number |
| C | company |
| D | eating strength |
| E | remarks |
| F | week |
| G... | timeslots |

The week is a code starting with the date of the first day of the week, in
`DDMMYY` form (for example `150324A` for a week starting on 15 March 2024).
Week codes are sorted as text, so the dates must be written with the same
number of digits in every response.

The timeslot cells come in blocks of 7 cells per day (`dayTimeslotColumns`),
for up to 7 days. A cell contains the label of the chosen timeslot, such as
`0530 - 0610`, or nothing. Several responses may bid for the same week: their
bids are put together.

## Output format

The output sheet (`Cookhouse Timings`) is a copy of the template sheet
(`Cookhouse Timings Template`). The first day is written in column C, and
every following day two columns further. The first row of a day receives
its name and date, for example `Friday (150324)`. Each timeslot has a fixed
row:

| timeslot | row |
|----------|-----|
| `0530 Collection Time` | 4 |
| `0750 Collection Time` | 5 |
| `0530 - 0610` | 8 |
| `0610 - 0650` | 9 |
| `0650 - 0730` | 10 |
| `1130 Collection Time` | 12 |
| `1350 Collection Time` | 13 |
| `1130 - 1210` | 16 |
| `1210 - 1250` | 17 |
| `1250 - 1330` | 18 |
| `1730 Collection Time` | 20 |
| `1950 Collection Time` | 21 |
| `1730 - 1810` | 24 |
| `1810 - 1850` | 25 |
| `1850 - 1930` | 26 |
| `2030 - 2050` | 28 |
| `2050 - 2110` | 29 |
| `2110 - 2130` | 30 |

A timeslot cell lists the companies that bid for it, one per line, as
`<company> (<eating strength>)`. The template columns after the last day are
hidden. Labels that are not in the table are ignored (a warning is logged).

## Configuration

The options are read from a JSON file passed with `--config`:

```json
{
  "inputSheet": "Form Responses",
  "templateSheet": "Cookhouse Timings Template",
  "outputSheet": "Cookhouse Timings",
  "dayTimeslotColumns": 7,
  "templatePath": "template.xlsx",
  "templateColumns": 37,
  "rejectMalformedRows": false,
  "outputPath": "timings.xlsx",
  "timeslotRows": [{ "label": "0530 - 0610", "row": 8 }]
}
```

All the fields are optional. `timeslotRows` replaces the whole timeslot table.
`templateColumns` is the number of columns the template can hold, blank
columns included. When `rejectMalformedRows` is true, a response
without company, eating strength or week stops the generation. Otherwise the
missing values are shown as `undefined`.

*/
